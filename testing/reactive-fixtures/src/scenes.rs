use reactive_property::{Reactive, include_generated};

///
/// ReactivePropertyExample
///

#[allow(non_snake_case)]
#[derive(Debug, Default, Reactive)]
pub struct ReactivePropertyExample {
    #[ReactiveProperty]
    _reactiveField: f32,
    events: ReactivePropertyExampleEvents,
}

include_generated!("ReactivePropertyExample_Classes_g");
