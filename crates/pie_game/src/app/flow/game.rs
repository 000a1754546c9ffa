/// Top-level router for one run: kitchen and hall alternate per stage until
/// a successful terminal delivery reaches an ending.
pub(crate) struct GameFlow<S: StateStorage> {
    store: RunStateStore<S>,
    kitchen: KitchenFlow,
    hall: HallFlow,
    active_scene: SceneKey,
    finished: Option<Ending>,
}

impl<S: StateStorage> GameFlow<S> {
    pub(crate) fn new(store: RunStateStore<S>, stages_dir: PathBuf) -> Self {
        Self {
            store,
            kitchen: KitchenFlow::new(),
            hall: HallFlow::new(stages_dir),
            active_scene: SceneKey::Kitchen,
            finished: None,
        }
    }

    pub(crate) fn store(&self) -> &RunStateStore<S> {
        &self.store
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn finished(&self) -> Option<Ending> {
        self.finished
    }

    pub(crate) fn hall_stage(&self) -> Option<&StageData> {
        self.hall.stage()
    }

    pub(crate) fn kitchen_event_counts(&self) -> KitchenEventCounts {
        self.kitchen.event_counts()
    }

    pub(crate) fn start_new_run(&mut self) {
        self.store.reset_run();
        self.hall.leave();
        self.finished = None;
        self.active_scene = SceneKey::Kitchen;
        info!("run_reset");
    }

    /// Route one kitchen gesture. Carrying the pie over loads the hall
    /// stage; a load failure keeps the player in the kitchen and surfaces
    /// the error to the caller.
    pub(crate) fn handle_kitchen_event(&mut self, event: KitchenEvent) -> Result<(), StageError> {
        if self.active_scene != SceneKey::Kitchen {
            debug!(
                scene = self.active_scene.as_token(),
                "kitchen_event_outside_kitchen_ignored"
            );
            return Ok(());
        }
        let command = self.kitchen.handle_event(event, &mut self.store);
        if let FlowCommand::SwitchTo(SceneKey::Hall) = command {
            let stage_id = self.store.state().stage_id;
            self.hall.enter(stage_id)?;
            self.active_scene = SceneKey::Hall;
        }
        Ok(())
    }

    /// One delivery attempt. Ignored outside the hall.
    pub(crate) fn deliver(&mut self) -> Option<DeliveryReport> {
        if self.active_scene != SceneKey::Hall {
            debug!(
                scene = self.active_scene.as_token(),
                "delivery_outside_hall_ignored"
            );
            return None;
        }
        let report = self.hall.deliver(&mut self.store)?;
        match report.command {
            FlowCommand::FinishRun(ending) => {
                self.hall.leave();
                self.finished = Some(ending);
                self.active_scene = SceneKey::Ending;
                info!(ending = ending.as_token(), "run_finished");
            }
            FlowCommand::SwitchTo(scene) => {
                self.hall.leave();
                self.active_scene = scene;
            }
            FlowCommand::None => {}
        }
        Some(report)
    }
}
