#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SceneKey {
    Kitchen,
    Hall,
    Ending,
}

impl SceneKey {
    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Hall => "hall",
            Self::Ending => "ending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlowCommand {
    None,
    SwitchTo(SceneKey),
    FinishRun(Ending),
}

/// One user gesture in the kitchen. The presentation layer translates drags
/// and taps into these; nothing here knows about sprites or layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KitchenEvent {
    BeginAssembly,
    ApplyFilling(String),
    ApplyLattice,
    Bake,
    AddTopping(String),
    CarryToHall,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct KitchenEventCounts {
    pub(crate) total: u32,
    pub(crate) ignored: u32,
}

impl KitchenEventCounts {
    fn record(&mut self) {
        self.total = self.total.saturating_add(1);
    }

    fn record_ignored(&mut self) {
        self.ignored = self.ignored.saturating_add(1);
    }
}

/// Everything the presentation layer needs to play out one delivery
/// attempt.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DeliveryReport {
    pub(crate) ok: bool,
    pub(crate) pie: Option<CarriedPie>,
    pub(crate) line: SpokenLine,
    pub(crate) stage_before: u8,
    pub(crate) stage_after: u8,
    pub(crate) command: FlowCommand,
    pub(crate) epilogue: Vec<SpokenLine>,
}
