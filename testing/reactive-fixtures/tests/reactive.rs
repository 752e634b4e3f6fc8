use reactive_fixtures::{ReactiveProperty, game::Player, scenes::ReactivePropertyExample};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);

    (count, move || {
        inner.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn setting_a_new_value_fires_once() {
    let mut example = ReactivePropertyExample::default();
    let (fired, listener) = counter();
    example.reactive_field_changed().subscribe(listener);

    example.set_reactive_field(10.0);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!((*example.reactive_field() - 10.0).abs() < f32::EPSILON);

    example.set_reactive_field(10.0);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn setting_without_listeners_still_updates() {
    let mut example = ReactivePropertyExample::default();
    example.set_reactive_field(2.5);

    assert!((*example.reactive_field() - 2.5).abs() < f32::EPSILON);
    assert!(example.reactive_field_changed().is_empty());
}

#[test]
fn properties_raise_their_own_events() {
    let mut player = Player::new("ada", 100);
    let (name_fired, on_name) = counter();
    let (health_fired, on_health) = counter();
    player.name_changed().subscribe(on_name);
    player.health_changed().subscribe(on_health);

    player.set_health(90);
    player.set_health(90);
    player.set_name("grace".to_string());

    assert_eq!(health_fired.load(Ordering::SeqCst), 1);
    assert_eq!(name_fired.load(Ordering::SeqCst), 1);
    assert_eq!(player.name(), "grace");
    assert_eq!(*player.health(), 90);
    assert_eq!(player.level(), 0);
}

#[test]
fn unsubscribed_listener_stops_firing() {
    let mut player = Player::new("ada", 1);
    let (fired, listener) = counter();
    let id = player.health_changed().subscribe(listener);

    player.set_health(2);
    assert!(player.health_changed().unsubscribe(id));
    player.set_health(3);

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn marker_definition_is_part_of_the_crate() {
    let marker = ReactiveProperty::default();

    assert_eq!(marker.property_name, None);
    assert_eq!(ReactiveProperty::TARGETS, ["field"]);
    assert!(!ReactiveProperty::INHERITED);
    assert!(!ReactiveProperty::ALLOW_MULTIPLE);
}
