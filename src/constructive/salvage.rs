//! Leftover salvage pass.
//!
//! After construction, orders still in the unassigned pool get one more
//! chance: each is appended to the first existing assignment whose vehicle
//! still has room for it. Assignments are tried in the order construction
//! produced them, and the leftovers in ascending index order.
//!
//! Construction only stops loading a vehicle once nothing left fits, so this
//! pass rarely places anything. It guards the pool against future changes to
//! the construction rules.

use log::debug;

use crate::constraints::CapacityConstraint;
use crate::models::DispatchProblem;

use super::Construction;

/// Appends leftover orders to the first assignment with spare capacity.
///
/// Returns the number of orders placed.
pub fn salvage_leftovers(problem: &DispatchProblem, construction: &mut Construction) -> usize {
    let orders = problem.orders();
    let vehicles = problem.vehicles();
    let leftovers: Vec<usize> = construction.unassigned.iter().copied().collect();
    let mut placed = 0;

    for oi in leftovers {
        let order = &orders[oi];
        let slot = construction.assignments.iter_mut().find(|a| {
            let vehicle = &vehicles[a.vehicle_index];
            CapacityConstraint::new(vehicle.max_weight_kg(), vehicle.max_volume_m3()).admits(
                a.weight_kg,
                a.volume_m3,
                order.weight_kg(),
                order.volume_m3(),
            )
        });
        if let Some(assignment) = slot {
            assignment.orders.push(oi);
            assignment.weight_kg += order.weight_kg();
            assignment.volume_m3 += order.volume_m3();
            construction.unassigned.remove(&oi);
            placed += 1;
            debug!(
                "salvaged order {} onto vehicle {}",
                order.id(),
                vehicles[assignment.vehicle_index].id()
            );
        }
    }

    placed
}
