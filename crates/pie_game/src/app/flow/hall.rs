/// Hall phase: owns the stage document for the current visit and runs the
/// delivery-outcome pipeline when the presentation layer reports a pie
/// dropped on the customer.
pub(crate) struct HallFlow {
    stages_dir: PathBuf,
    stage: Option<StageData>,
}

impl HallFlow {
    pub(crate) fn new(stages_dir: PathBuf) -> Self {
        Self {
            stages_dir,
            stage: None,
        }
    }

    /// Load the stage document for this visit. A load failure is fatal for
    /// entering the hall; the caller stays where it is.
    pub(crate) fn enter(&mut self, stage_id: u8) -> Result<(), StageError> {
        let stage = pie_core::load_stage(&self.stages_dir, stage_id)?;
        info!(
            stage_id = stage.id,
            customer_count = stage.customers.len(),
            "hall_entered"
        );
        self.stage = Some(stage);
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.stage = None;
    }

    pub(crate) fn stage(&self) -> Option<&StageData> {
        self.stage.as_ref()
    }

    /// One delivery attempt, in pipeline order: evaluate, mark the pie
    /// delivered, record the outcome, discard the pie, advance on success,
    /// then decide where the flow goes next. Returns None when no stage is
    /// loaded.
    pub(crate) fn deliver<S: StateStorage>(
        &mut self,
        store: &mut RunStateStore<S>,
    ) -> Option<DeliveryReport> {
        let Some(stage) = self.stage.as_ref() else {
            debug!("delivery_ignored_no_stage_loaded");
            return None;
        };
        let customer = stage.lead_customer();
        let stage_before = store.state().stage_id;

        let mut pie = store.state().carried_pie.clone();
        let ok = evaluate(pie.as_ref(), &customer.order);
        if let Some(pie) = pie.as_mut() {
            // The stored pie is discarded regardless of the outcome, so the
            // delivered mark lives on in the report for the hand-over
            // visuals.
            pie.delivered = true;
        }
        store.record_evaluation(ok);
        store.clear_carried_pie();

        let stage_after = if ok {
            store.advance_stage()
        } else {
            stage_before
        };

        // Only a successful terminal delivery finishes the run; a failed
        // one leaves the player retrying at the last stage. Either way the
        // next pie starts back in the kitchen.
        let finished = ok && stage_before == LAST_STAGE_ID;
        let command = if finished {
            FlowCommand::FinishRun(store.compute_ending())
        } else {
            FlowCommand::SwitchTo(SceneKey::Kitchen)
        };
        let line = if ok {
            customer.success_line.clone()
        } else {
            customer.fail_line.clone()
        };
        let epilogue = if finished {
            stage.epilogue.clone()
        } else {
            Vec::new()
        };
        info!(ok, stage_before, stage_after, "delivery_evaluated");

        Some(DeliveryReport {
            ok,
            pie,
            line,
            stage_before,
            stage_after,
            command,
            epilogue,
        })
    }
}
