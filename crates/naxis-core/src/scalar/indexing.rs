//! Direct indexing handler of scalar arrays
//!
//! Accepts boolean masks and axis-keyed items made of integers, slices and
//! integer index arrays. Anything else is declined (`None`) so the reversed
//! handlers get a chance.

use super::types::ScalarArray;
use crate::array::Array;
use crate::error::{NamedArrayError, Result};
use crate::indexing::{IndexSpec, Item};
use crate::shape::{broadcast_shapes, flatten_axes, HasShape, NamedShape, Odometer};
use crate::types::Element;
use scirs2_core::ndarray_ext::IxDyn;

/// How one host axis is addressed while gathering.
enum Selection {
    /// One fixed position; the axis disappears
    Fixed(usize),
    /// Positions kept as an output axis
    Kept { out: usize, positions: Vec<usize> },
    /// Positions read from an index array aligned to the output shape
    Gathered(Vec<i64>),
}

fn checked_position(axis: &str, index: i64, size: usize) -> Result<usize> {
    let resolved = if index < 0 { index + size as i64 } else { index };
    if resolved < 0 || resolved >= size as i64 {
        return Err(NamedArrayError::IndexOutOfBounds {
            axis: axis.to_string(),
            index,
            size,
        });
    }
    Ok(resolved as usize)
}

impl<T: Element> ScalarArray<T> {
    /// Try to index this array directly.
    pub(crate) fn getitem_direct(&self, item: &Item) -> Option<Result<Self>> {
        match item {
            Item::Array(Array::Bool(mask)) => Some(self.getitem_mask(mask)),
            Item::Array(_) => None,
            Item::Axes(_) => self.getitem_axes(item),
        }
    }

    fn getitem_mask(&self, mask: &ScalarArray<bool>) -> Result<Self> {
        let shape = self.shape();
        let mut mask_shape = NamedShape::new();
        for axis in mask.axis_names() {
            let size = shape
                .get(axis)
                .ok_or_else(|| NamedArrayError::axis_not_found(axis, &self.axes))?;
            mask_shape.push(axis.clone(), size)?;
        }
        let flags: Vec<bool> = mask.broadcast_data(&mask_shape)?.iter().cloned().collect();

        let others = shape.without(mask.axis_names());
        let mut order = others.clone();
        for (axis, size) in mask_shape.iter() {
            order.push(axis, size)?;
        }
        let values: Vec<T> = self.ndarray_aligned(&order)?.iter().cloned().collect();

        let inner = mask_shape.size();
        let count = flags.iter().filter(|&&f| f).count();
        let mut selected = Vec::with_capacity(others.size() * count);
        for i in 0..others.size() {
            let chunk = &values[i * inner..(i + 1) * inner];
            selected.extend(
                chunk
                    .iter()
                    .zip(&flags)
                    .filter(|(_, keep)| **keep)
                    .map(|(v, _)| v.clone()),
            );
        }

        let mut out_shape = others;
        out_shape.push(flatten_axes(mask.axis_names()), count)?;
        let mut result = Self::from_vec(selected, &out_shape)?;
        result.unit = self.unit.clone();
        Ok(result)
    }

    fn getitem_axes(&self, item: &Item) -> Option<Result<Self>> {
        let supported = self.axes.iter().all(|axis| {
            matches!(
                item.get(axis),
                None | Some(IndexSpec::Int(_))
                    | Some(IndexSpec::Slice(_))
                    | Some(IndexSpec::Array(Array::Int(_)))
            )
        });
        if !supported {
            return None;
        }
        Some(self.select_axes(item))
    }

    fn select_axes(&self, item: &Item) -> Result<Self> {
        let shape = self.shape();
        let mut remaining = NamedShape::new();
        let mut index_arrays: Vec<(usize, &ScalarArray<i64>)> = Vec::new();
        let mut pending: Vec<Option<Selection>> = Vec::with_capacity(shape.len());

        for (position, (axis, size)) in shape.iter().enumerate() {
            let selection = match item.get(axis) {
                Some(IndexSpec::Int(index)) => {
                    Some(Selection::Fixed(checked_position(axis, *index, size)?))
                }
                Some(IndexSpec::Array(Array::Int(indices))) => {
                    index_arrays.push((position, indices));
                    None
                }
                Some(IndexSpec::Slice(slice)) => {
                    let positions = slice.indices(size)?;
                    remaining.push(axis, positions.len())?;
                    Some(Selection::Kept { out: 0, positions })
                }
                _ => {
                    remaining.push(axis, size)?;
                    Some(Selection::Kept {
                        out: 0,
                        positions: (0..size).collect(),
                    })
                }
            };
            pending.push(selection);
        }

        self.gather(&shape, remaining, index_arrays, pending)
    }

    fn gather(
        &self,
        shape: &NamedShape,
        remaining: NamedShape,
        index_arrays: Vec<(usize, &ScalarArray<i64>)>,
        mut pending: Vec<Option<Selection>>,
    ) -> Result<Self> {
        let index_shapes: Vec<NamedShape> = index_arrays.iter().map(|(_, a)| a.shape()).collect();
        let mut all: Vec<&NamedShape> = vec![&remaining];
        all.extend(index_shapes.iter());
        let out_shape = broadcast_shapes(&all)?;

        for (position, indices) in index_arrays {
            let aligned = indices.broadcast_data(&out_shape)?.iter().cloned().collect();
            pending[position] = Some(Selection::Gathered(aligned));
        }
        let mut selections = Vec::with_capacity(pending.len());
        for (selection, (axis, _)) in pending.into_iter().zip(shape.iter()) {
            let selection = match selection {
                Some(Selection::Kept { positions, .. }) => Selection::Kept {
                    out: out_shape.position(axis).unwrap_or(0),
                    positions,
                },
                Some(other) => other,
                None => {
                    return Err(NamedArrayError::InvalidArgument(format!(
                        "axis '{}' has no selection",
                        axis
                    )))
                }
            };
            selections.push(selection);
        }

        let sizes = shape.sizes();
        let mut values = Vec::with_capacity(out_shape.size());
        let mut coords = vec![0usize; sizes.len()];
        for (flat, out) in Odometer::new(out_shape.sizes()).enumerate() {
            for (axis, selection) in selections.iter().enumerate() {
                coords[axis] = match selection {
                    Selection::Fixed(p) => *p,
                    Selection::Kept { out: o, positions } => {
                        if positions.len() == 1 {
                            positions[0]
                        } else {
                            positions[out[*o]]
                        }
                    }
                    Selection::Gathered(indices) => {
                        checked_position(&self.axes[axis], indices[flat], sizes[axis])?
                    }
                };
            }
            values.push(self.data[IxDyn(&coords)].clone());
        }

        let mut result = Self::from_vec(values, &out_shape)?;
        result.unit = self.unit.clone();
        Ok(result)
    }
}
