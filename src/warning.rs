//! non-fatal degradations reported while writing a mesh

use crate::prelude::*;

/// Something a writer had to change or leave out to produce a valid file.
///
/// Every warning is logged through the `log` facade when it is raised, and
/// the full list is returned to the caller of the write.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum Warning {
    #[display(fmt = "{format} does not support {from} cell indices; casting down to {to}")]
    NarrowedIndices {
        format: &'static str,
        from: Dtype,
        to: Dtype,
    },
    #[display(fmt = "cell type `{cell_type}` is not supported by {format}; skipping")]
    SkippedCellType {
        format: &'static str,
        cell_type: CellType,
    },
    #[display(fmt = "{format} writer does not support cell data; skipping `{name}`")]
    SkippedCellData { format: &'static str, name: String },
    #[display(fmt = "{format} writer does not support multidimensional point data; skipping `{name}`")]
    SkippedPointData { format: &'static str, name: String },
}

/// log `warning` and record it
pub(crate) fn warn(warnings: &mut Vec<Warning>, warning: Warning) {
    log::warn!("{warning}");
    warnings.push(warning);
}
