/// Kitchen phase: applies assembly gestures to the carried pie, persisting
/// through the store after every event. Events that cannot apply are
/// dropped quietly; the player just sees nothing happen.
pub(crate) struct KitchenFlow {
    event_counts: KitchenEventCounts,
}

impl KitchenFlow {
    pub(crate) fn new() -> Self {
        Self {
            event_counts: KitchenEventCounts::default(),
        }
    }

    pub(crate) fn event_counts(&self) -> KitchenEventCounts {
        self.event_counts
    }

    pub(crate) fn handle_event<S: StateStorage>(
        &mut self,
        event: KitchenEvent,
        store: &mut RunStateStore<S>,
    ) -> FlowCommand {
        self.event_counts.record();
        match event {
            KitchenEvent::BeginAssembly => {
                store.set_carried_pie(CarriedPie::new());
                debug!("pie_assembly_started");
                FlowCommand::None
            }
            KitchenEvent::ApplyFilling(filling) => {
                self.update_pie(store, |pie| pie.apply_filling(filling));
                FlowCommand::None
            }
            KitchenEvent::ApplyLattice => {
                self.update_pie(store, |pie| pie.apply_lattice());
                FlowCommand::None
            }
            KitchenEvent::Bake => {
                self.update_pie(store, |pie| pie.bake());
                FlowCommand::None
            }
            KitchenEvent::AddTopping(topping) => {
                // Toppings go on after baking; earlier drops slide off.
                match store.state().carried_pie.clone() {
                    Some(mut pie) if pie.cooked => {
                        pie.add_topping(topping);
                        store.set_carried_pie(pie);
                    }
                    Some(_) => {
                        self.event_counts.record_ignored();
                        debug!(topping = %topping, "topping_ignored_pie_not_baked");
                    }
                    None => {
                        self.event_counts.record_ignored();
                        debug!(topping = %topping, "topping_ignored_no_pie");
                    }
                }
                FlowCommand::None
            }
            KitchenEvent::CarryToHall => {
                if store.state().carried_pie.is_none() {
                    self.event_counts.record_ignored();
                    debug!("carry_ignored_no_pie");
                    return FlowCommand::None;
                }
                FlowCommand::SwitchTo(SceneKey::Hall)
            }
        }
    }

    fn update_pie<S: StateStorage>(
        &mut self,
        store: &mut RunStateStore<S>,
        apply: impl FnOnce(&mut CarriedPie),
    ) {
        let Some(mut pie) = store.state().carried_pie.clone() else {
            self.event_counts.record_ignored();
            debug!("kitchen_event_ignored_no_pie");
            return;
        };
        apply(&mut pie);
        store.set_carried_pie(pie);
    }
}
