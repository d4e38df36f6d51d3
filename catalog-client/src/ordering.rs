//! Size display-order resolution
//!
//! Every size holds a distinct `display_order`. Moving a size onto a position
//! that another size holds swaps the two positions, so the set of orders in
//! use never changes and stays duplicate-free.
//!
//! The server enforces that uniqueness on every single update, so a swap
//! cannot be sent as two plain updates. It goes out as three steps: the
//! edited size is parked on a free order, the displaced size moves into the
//! freed slot, then the edited size lands on its target. Each step carries
//! the update that reverts it.

use std::collections::HashSet;

use shared::{Size, SizeUpdate};
use thiserror::Error;

/// Requested change to a size
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeEdit {
    pub name: Option<String>,
    pub display_order: Option<u32>,
}

impl SizeEdit {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            display_order: None,
        }
    }

    pub fn reorder(display_order: u32) -> Self {
        Self {
            name: None,
            display_order: Some(display_order),
        }
    }
}

/// Rejected size edits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("Size {0} not found")]
    UnknownSize(i64),

    #[error("Display order must be a positive number")]
    InvalidOrder,

    #[error("Size name is required")]
    EmptyName,

    #[error("Display order {0} is held by more than one size, reload before reordering")]
    AmbiguousOrder(u32),
}

/// Update for one size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeAssignment {
    pub size_id: i64,
    pub update: SizeUpdate,
}

impl SizeAssignment {
    fn new(size_id: i64, name: Option<String>, display_order: u32) -> Self {
        Self {
            size_id,
            update: SizeUpdate {
                name,
                display_order: Some(display_order),
            },
        }
    }
}

/// One request of a swap and the request that undoes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapStep {
    pub forward: SizeAssignment,
    pub revert: SizeAssignment,
}

/// What has to be sent to apply an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditPlan {
    /// Nothing changes, no request is sent
    Unchanged,
    /// Single update; nobody else holds the target order
    Direct(SizeAssignment),
    /// `edited` takes the target order, `displaced` takes the edited size's old order
    Swap {
        edited: SizeAssignment,
        displaced: SizeAssignment,
        /// Requests in send order; no prefix of them leaves a duplicate order
        steps: Vec<SwapStep>,
    },
}

/// Work out the requests needed to apply `edit` to size `size_id`.
pub fn plan_edit(sizes: &[Size], size_id: i64, edit: &SizeEdit) -> Result<EditPlan, OrderingError> {
    let current = sizes
        .iter()
        .find(|s| s.id == size_id)
        .ok_or(OrderingError::UnknownSize(size_id))?;

    let name = match edit.name.as_deref().map(str::trim) {
        Some("") => return Err(OrderingError::EmptyName),
        Some(name) if name != current.name => Some(name.to_string()),
        _ => None,
    };

    let target = match edit.display_order {
        Some(0) => return Err(OrderingError::InvalidOrder),
        Some(order) if order != current.display_order => Some(order),
        _ => None,
    };

    let Some(target) = target else {
        return Ok(match name {
            Some(name) => EditPlan::Direct(SizeAssignment {
                size_id,
                update: SizeUpdate {
                    name: Some(name),
                    display_order: None,
                },
            }),
            None => EditPlan::Unchanged,
        });
    };

    let mut holders = sizes
        .iter()
        .filter(|s| s.id != size_id && s.display_order == target);
    let holder = holders.next();
    if holders.next().is_some() {
        return Err(OrderingError::AmbiguousOrder(target));
    }

    let restore_name = name.as_ref().map(|_| current.name.clone());
    let edited = SizeAssignment::new(size_id, name, target);
    let Some(holder) = holder else {
        return Ok(EditPlan::Direct(edited));
    };

    let previous = current.display_order;
    let parking = sizes
        .iter()
        .map(|s| s.display_order)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or(OrderingError::InvalidOrder)?;
    let displaced = SizeAssignment::new(holder.id, None, previous);

    let steps = vec![
        SwapStep {
            forward: SizeAssignment::new(size_id, None, parking),
            revert: SizeAssignment::new(size_id, None, previous),
        },
        SwapStep {
            forward: displaced.clone(),
            revert: SizeAssignment::new(holder.id, None, target),
        },
        SwapStep {
            forward: edited.clone(),
            revert: SizeAssignment::new(size_id, restore_name, parking),
        },
    ];

    Ok(EditPlan::Swap {
        edited,
        displaced,
        steps,
    })
}

/// Sizes as they will look once `plan` is committed.
pub fn apply_plan(sizes: &[Size], plan: &EditPlan) -> Vec<Size> {
    let mut sizes = sizes.to_vec();
    match plan {
        EditPlan::Unchanged => {}
        EditPlan::Direct(edited) => apply_assignment(&mut sizes, edited),
        EditPlan::Swap { steps, .. } => {
            for step in steps {
                apply_assignment(&mut sizes, &step.forward);
            }
        }
    }
    sizes
}

fn apply_assignment(sizes: &mut [Size], assignment: &SizeAssignment) {
    for size in sizes.iter_mut().filter(|s| s.id == assignment.size_id) {
        if let Some(name) = &assignment.update.name {
            size.name = name.clone();
        }
        if let Some(order) = assignment.update.display_order {
            size.display_order = order;
        }
    }
}

/// Whether no two sizes share a display order
pub fn has_unique_orders(sizes: &[Size]) -> bool {
    let mut seen = HashSet::with_capacity(sizes.len());
    sizes.iter().all(|s| seen.insert(s.display_order))
}
