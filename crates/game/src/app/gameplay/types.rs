#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndReason {
    TimeUp,
    BottomLaneEliminated,
}

impl EndReason {
    fn as_token(self) -> &'static str {
        match self {
            EndReason::TimeUp => "time_up",
            EndReason::BottomLaneEliminated => "bottom_lane_eliminated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) score: u32,
    pub(crate) reason: EndReason,
}

/// Last finished run, written by the game scene and read by the result scene.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunBoard(Rc<Cell<Option<RunSummary>>>);

impl RunBoard {
    pub(crate) fn publish(&self, summary: RunSummary) {
        self.0.set(Some(summary));
    }

    pub(crate) fn latest(&self) -> Option<RunSummary> {
        self.0.get()
    }
}

/// Player handles captured at scene load, one slot per lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LanePlayers {
    handles: [Option<EntityId>; 3],
}

impl LanePlayers {
    fn get(&self, stage: Stage) -> Option<EntityId> {
        self.handles[stage.index()]
    }

    fn set(&mut self, stage: Stage, id: EntityId) {
        self.handles[stage.index()] = Some(id);
    }
}

/// Per-lane elimination flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LaneFlags([bool; 3]);

impl LaneFlags {
    fn is_set(&self, stage: Stage) -> bool {
        self.0[stage.index()]
    }

    fn set(&mut self, stage: Stage) {
        self.0[stage.index()] = true;
    }
}

/// Panel-derived movement intents for one tick. Rebuilt from scratch every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PanelIntents {
    raised: [[bool; 4]; 3],
}

impl PanelIntents {
    fn raise(&mut self, lane: Stage, direction: Direction) {
        self.raised[lane.index()][direction.index()] = true;
    }

    fn is_raised(&self, lane: Stage, direction: Direction) -> bool {
        self.raised[lane.index()][direction.index()]
    }
}
