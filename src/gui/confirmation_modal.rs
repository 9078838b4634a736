use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResult {
    None,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructiveAction {
    ClearDashboard,
    ReplaceDashboard,
}

impl DestructiveAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::ClearDashboard => "Are you sure you want to clear all widgets?",
            Self::ReplaceDashboard => "Loading a saved dashboard replaces every widget on screen.",
        }
    }

    pub fn confirm_label(self) -> &'static str {
        match self {
            Self::ClearDashboard => "Clear",
            Self::ReplaceDashboard => "Load",
        }
    }

    pub fn warning(self) -> &'static str {
        "Unsaved widgets will be lost."
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmationModal {
    open: bool,
    kind: Option<DestructiveAction>,
    title: String,
    description: String,
    warning: String,
    confirm_label: String,
    cancel_label: String,
}

impl Default for ConfirmationModal {
    fn default() -> Self {
        Self {
            open: false,
            kind: None,
            title: "Confirm".into(),
            description: String::new(),
            warning: String::new(),
            confirm_label: "Confirm".into(),
            cancel_label: "Cancel".into(),
        }
    }
}

impl ConfirmationModal {
    pub fn open_for(&mut self, kind: DestructiveAction) {
        self.kind = Some(kind);
        self.description = kind.label().into();
        self.warning = kind.warning().into();
        self.confirm_label = kind.confirm_label().into();
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The action the modal was last opened for.
    pub fn kind(&self) -> Option<DestructiveAction> {
        self.kind
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> ConfirmationResult {
        if !self.open {
            return ConfirmationResult::None;
        }
        let mut result = ConfirmationResult::None;
        let mut open = true;
        egui::Window::new(self.title.clone())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                if !self.description.is_empty() {
                    ui.label(&self.description);
                }
                ui.colored_label(egui::Color32::YELLOW, &self.warning);
                ui.horizontal(|ui| {
                    if ui.button(&self.confirm_label).clicked() {
                        result = ConfirmationResult::Confirmed;
                    }
                    if ui.button(&self.cancel_label).clicked() {
                        result = ConfirmationResult::Cancelled;
                    }
                });
            });
        if result != ConfirmationResult::None {
            self.open = false;
        }
        if !open {
            self.open = false;
            if result == ConfirmationResult::None {
                result = ConfirmationResult::Cancelled;
            }
        }
        result
    }
}
