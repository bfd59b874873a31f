use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use vanguard::game::CommandLayerPlugin;
use vanguard::game::control::{PointerInput, SelectionSet};
use vanguard::game::movement::MovementController;
use vanguard::game::unit::{enemy_unit, player_unit, SelectionIndicator, UnitDefaults};

fn headless_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(CommandLayerPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)));
    app.update();
    app
}

fn spawn_player(app: &mut App, x: f32, z: f32) -> Entity {
    let defaults = UnitDefaults::default();
    app.world_mut().spawn(player_unit(Vec3::new(x, 0.0, z), &defaults)).id()
}

fn spawn_enemy(app: &mut App, x: f32, z: f32) -> Entity {
    let defaults = UnitDefaults::default();
    app.world_mut().spawn(enemy_unit(Vec3::new(x, 0.0, z), &defaults)).id()
}

/// Screen position of a ground point under the default top-down projection.
fn screen(x: f32, z: f32) -> Vec2 {
    Vec2::new(x, z) * 10.0
}

/// Run one tick with `input`, then return the pointer to rest at the same spot.
fn frame(app: &mut App, input: PointerInput) {
    *app.world_mut().resource_mut::<PointerInput>() = input;
    app.update();
    *app.world_mut().resource_mut::<PointerInput>() = PointerInput {
        cursor: input.cursor,
        ..default()
    };
}

fn click(app: &mut App, at: Vec2, modifier: bool) {
    frame(app, PointerInput {
        primary_pressed: true,
        primary_held: true,
        modifier_held: modifier,
        cursor: at,
        ..default()
    });
    frame(app, PointerInput {
        primary_released: true,
        modifier_held: modifier,
        cursor: at,
        ..default()
    });
}

fn press(app: &mut App, at: Vec2, modifier: bool) {
    frame(app, PointerInput {
        primary_pressed: true,
        primary_held: true,
        modifier_held: modifier,
        cursor: at,
        ..default()
    });
}

fn hold(app: &mut App, at: Vec2) {
    frame(app, PointerInput { primary_held: true, cursor: at, ..default() });
}

fn release(app: &mut App, at: Vec2) {
    frame(app, PointerInput { primary_released: true, cursor: at, ..default() });
}

fn drag(app: &mut App, from: Vec2, to: Vec2, modifier: bool) {
    press(app, from, modifier);
    hold(app, from.lerp(to, 0.5));
    hold(app, to);
    release(app, to);
}

fn selected(app: &App) -> Vec<Entity> {
    let mut members = app.world().resource::<SelectionSet>().members().to_vec();
    members.sort();
    members
}

fn sorted(mut units: Vec<Entity>) -> Vec<Entity> {
    units.sort();
    units
}

/// Indicator and movement permission must equal selection membership for every unit.
fn assert_flags_in_sync(app: &mut App) {
    let members = app.world().resource::<SelectionSet>().members().to_vec();
    let mut query = app
        .world_mut()
        .query::<(Entity, &SelectionIndicator, Option<&MovementController>)>();
    for (entity, indicator, controller) in query.iter(app.world()) {
        let is_member = members.contains(&entity);
        assert_eq!(indicator.visible, is_member, "indicator drift on {:?}", entity);
        if let Some(controller) = controller {
            assert_eq!(controller.enabled, is_member, "movement drift on {:?}", entity);
        }
    }
}

#[test]
fn test_click_selects_only_clicked_unit() {
    let mut app = headless_app();
    let a = spawn_player(&mut app, 2.0, 2.0);
    let b = spawn_player(&mut app, 6.0, 2.0);
    app.update();

    click(&mut app, screen(2.0, 2.0), false);
    assert_eq!(selected(&app), vec![a]);
    assert_flags_in_sync(&mut app);

    click(&mut app, screen(6.0, 2.0), false);
    assert_eq!(selected(&app), vec![b]);
    assert_flags_in_sync(&mut app);
}

#[test]
fn test_shift_click_toggles_membership() {
    let mut app = headless_app();
    let u = spawn_player(&mut app, 0.0, 0.0);
    let v = spawn_enemy(&mut app, 4.0, 0.0);
    app.update();

    // 1. Select U, shift-click enemy V: both selected
    click(&mut app, screen(0.0, 0.0), false);
    click(&mut app, screen(4.0, 0.0), true);
    assert_eq!(selected(&app), sorted(vec![u, v]));
    assert!(app.world().get::<SelectionIndicator>(u).unwrap().visible);
    assert!(app.world().get::<SelectionIndicator>(v).unwrap().visible);

    // 2. Shift-click V again: only V leaves
    click(&mut app, screen(4.0, 0.0), true);
    assert_eq!(selected(&app), vec![u]);
    assert!(!app.world().get::<SelectionIndicator>(v).unwrap().visible);
    assert_flags_in_sync(&mut app);
}

#[test]
fn test_click_on_nothing() {
    let mut app = headless_app();
    let a = spawn_player(&mut app, 0.0, 0.0);
    app.update();

    click(&mut app, screen(0.0, 0.0), false);

    // Modifier held: miss is ignored
    click(&mut app, screen(10.0, 10.0), true);
    assert_eq!(selected(&app), vec![a]);

    // No modifier: miss clears, twice is the same as once
    click(&mut app, screen(10.0, 10.0), false);
    assert!(selected(&app).is_empty());
    click(&mut app, screen(10.0, 10.0), false);
    assert!(selected(&app).is_empty());
    assert_flags_in_sync(&mut app);
}

#[test]
fn test_drag_box_is_direction_independent() {
    let mut app = headless_app();
    let a = spawn_player(&mut app, 2.0, 2.0);
    let b = spawn_player(&mut app, 4.0, 3.0);
    let _c = spawn_player(&mut app, 10.0, 10.0);
    app.update();

    let top_left = Vec2::new(10.0, 10.0);
    let bottom_right = Vec2::new(50.0, 40.0);

    drag(&mut app, top_left, bottom_right, false);
    assert_eq!(selected(&app), sorted(vec![a, b]));
    assert_flags_in_sync(&mut app);

    click(&mut app, screen(-10.0, -10.0), false);
    assert!(selected(&app).is_empty());

    drag(&mut app, bottom_right, top_left, false);
    assert_eq!(selected(&app), sorted(vec![a, b]));
    assert_flags_in_sync(&mut app);
}

#[test]
fn test_shrinking_drag_deselects() {
    let mut app = headless_app();
    let a = spawn_player(&mut app, 2.0, 2.0);
    let b = spawn_player(&mut app, 4.0, 4.0);
    app.update();

    press(&mut app, Vec2::ZERO, false);
    hold(&mut app, Vec2::new(50.0, 50.0));
    assert_eq!(selected(&app), sorted(vec![a, b]));

    hold(&mut app, Vec2::new(30.0, 30.0));
    assert_eq!(selected(&app), vec![a]);
    assert!(!app.world().get::<SelectionIndicator>(b).unwrap().visible);

    release(&mut app, Vec2::new(30.0, 30.0));
    assert_eq!(selected(&app), vec![a]);
    assert_flags_in_sync(&mut app);
}

#[test]
fn test_modifier_drag_keeps_prior_selection() {
    let mut app = headless_app();
    let a = spawn_player(&mut app, 2.0, 2.0);
    let b = spawn_player(&mut app, 4.0, 3.0);
    let c = spawn_player(&mut app, 10.0, 10.0);
    app.update();

    click(&mut app, screen(10.0, 10.0), false);
    drag(&mut app, Vec2::new(10.0, 10.0), Vec2::new(50.0, 40.0), true);
    assert_eq!(selected(&app), sorted(vec![a, b, c]));

    // Without the modifier the box replaces the selection
    click(&mut app, screen(10.0, 10.0), false);
    drag(&mut app, Vec2::new(10.0, 10.0), Vec2::new(50.0, 40.0), false);
    assert_eq!(selected(&app), sorted(vec![a, b]));
    assert_flags_in_sync(&mut app);
}

#[test]
fn test_randomized_drag_boxes() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let mut app = headless_app();

    let units: Vec<(Entity, Vec2)> = (0..16)
        .map(|_| {
            let x = rng.f32() * 40.0 - 20.0;
            let z = rng.f32() * 40.0 - 20.0;
            (spawn_player(&mut app, x, z), screen(x, z))
        })
        .collect();
    app.update();

    for round in 0..10 {
        let from = Vec2::new(rng.f32() * 400.0 - 200.0, rng.f32() * 400.0 - 200.0);
        let to = Vec2::new(rng.f32() * 400.0 - 200.0, rng.f32() * 400.0 - 200.0);
        let rect = Rect::from_corners(from, to);
        let expected = sorted(
            units.iter().filter(|(_, at)| rect.contains(*at)).map(|(e, _)| *e).collect(),
        );

        drag(&mut app, from, to, false);
        let forward = selected(&app);
        drag(&mut app, to, from, false);
        let backward = selected(&app);

        assert_eq!(forward, expected, "round {} forward", round);
        assert_eq!(backward, expected, "round {} backward", round);
        assert_flags_in_sync(&mut app);
    }
}

#[test]
fn test_despawned_unit_leaves_selection() {
    let mut app = headless_app();
    let a = spawn_player(&mut app, 2.0, 2.0);
    let b = spawn_player(&mut app, 4.0, 3.0);
    app.update();

    drag(&mut app, Vec2::new(10.0, 10.0), Vec2::new(50.0, 40.0), false);
    assert_eq!(selected(&app), sorted(vec![a, b]));

    app.world_mut().despawn(a);
    app.update();
    assert_eq!(selected(&app), vec![b]);
}
