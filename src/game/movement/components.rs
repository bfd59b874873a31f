use bevy::prelude::*;

/// Navigation capability of a unit: accepts a destination, reports path
/// validity and remaining distance. Path resolution is asynchronous: a
/// destination set this tick is `path_pending` until the navigator picks it up.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct NavAgent {
    destination: Option<Vec3>,
    path_pending: bool,
    has_path: bool,
    remaining_distance: f32,
    pub stopping_distance: f32,
    pub speed: f32,
}

impl NavAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            destination: None,
            path_pending: false,
            has_path: false,
            remaining_distance: 0.0,
            stopping_distance,
            speed,
        }
    }

    pub fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
        self.path_pending = true;
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn path_pending(&self) -> bool {
        self.path_pending
    }

    pub fn has_active_path(&self) -> bool {
        self.has_path
    }

    pub fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }

    pub(super) fn resolve_pending(&mut self) {
        if self.path_pending {
            self.path_pending = false;
            self.has_path = self.destination.is_some();
        }
    }

    pub(super) fn report_progress(&mut self, remaining: f32) {
        self.remaining_distance = remaining;
        if remaining <= self.stopping_distance {
            self.has_path = false;
        }
    }
}

/// Explicit move order state. `enabled` mirrors selection membership and gates
/// new orders; the commanded flag is only ever cleared here, by arrival or by
/// losing the path.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct MovementController {
    pub enabled: bool,
    commanded: bool,
    destination: Option<Vec3>,
}

impl MovementController {
    pub fn is_commanded_to_move(&self) -> bool {
        self.commanded
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// Returns false if movement is disabled for this unit.
    pub fn issue_move_order(&mut self, point: Vec3, agent: &mut NavAgent) -> bool {
        if !self.enabled {
            return false;
        }
        agent.set_destination(point);
        self.destination = Some(point);
        self.commanded = true;
        true
    }

    /// Clears the order once navigation reports arrival or no valid path.
    /// Returns true on the tick the order clears.
    pub fn settle(&mut self, agent: &NavAgent) -> bool {
        if !self.commanded || agent.path_pending() {
            return false;
        }
        if !agent.has_active_path() || agent.remaining_distance() <= agent.stopping_distance {
            self.commanded = false;
            self.destination = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_controller_refuses_orders() {
        let mut controller = MovementController::default();
        let mut agent = NavAgent::new(5.0, 0.2);
        assert!(!controller.issue_move_order(Vec3::X, &mut agent));
        assert!(!controller.is_commanded_to_move());
        assert_eq!(agent.destination(), None);
    }

    #[test]
    fn pending_path_does_not_clear_order() {
        let mut controller = MovementController { enabled: true, ..default() };
        let mut agent = NavAgent::new(5.0, 0.2);
        assert!(controller.issue_move_order(Vec3::new(10.0, 0.0, 0.0), &mut agent));
        assert!(!controller.settle(&agent));
        assert!(controller.is_commanded_to_move());
    }

    #[test]
    fn clears_on_arrival() {
        let mut controller = MovementController { enabled: true, ..default() };
        let mut agent = NavAgent::new(5.0, 0.2);
        controller.issue_move_order(Vec3::new(10.0, 0.0, 0.0), &mut agent);
        agent.resolve_pending();
        agent.report_progress(4.0);
        assert!(!controller.settle(&agent));
        agent.report_progress(0.1);
        assert!(controller.settle(&agent));
        assert!(!controller.is_commanded_to_move());
        assert_eq!(controller.destination(), None);
    }

    #[test]
    fn settles_after_deselection() {
        let mut controller = MovementController { enabled: true, ..default() };
        let mut agent = NavAgent::new(5.0, 0.2);
        controller.issue_move_order(Vec3::X, &mut agent);
        controller.enabled = false;
        agent.resolve_pending();
        agent.report_progress(0.0);
        assert!(controller.settle(&agent));
    }
}
