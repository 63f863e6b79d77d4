//! Grid geometry for polyomino blocks
//!
//! A block covers `anchor + offset` for each offset in its shape.

use glam::IVec2;

use super::state::Block;

/// Absolute cells covered by `block`, at its own anchor or at `anchor` if given.
///
/// Pure: the block is not touched. One cell per shape offset, in shape order.
pub fn occupied_cells(block: &Block, anchor: Option<IVec2>) -> Vec<IVec2> {
    let base = anchor.unwrap_or(block.anchor);
    translate(&block.shape, base).collect()
}

/// Shape offsets moved onto `anchor`
#[inline]
pub fn translate(shape: &[IVec2], anchor: IVec2) -> impl Iterator<Item = IVec2> + '_ {
    shape.iter().map(move |&offset| anchor + offset)
}

/// Bounding-box extent of a shape as (width, height), zero for an empty shape
pub fn bounding_size(shape: &[IVec2]) -> IVec2 {
    match bounding_box(shape) {
        Some((min, max)) => max - min + IVec2::ONE,
        None => IVec2::ZERO,
    }
}

/// Inclusive (min, max) corners of a set of cells
pub fn bounding_box(cells: &[IVec2]) -> Option<(IVec2, IVec2)> {
    let first = *cells.first()?;
    Some(
        cells
            .iter()
            .fold((first, first), |(min, max), &c| (min.min(c), max.max(c))),
    )
}
