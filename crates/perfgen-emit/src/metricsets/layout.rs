//! OA report layouts.

use crate::writer::CodeWriter;
use crate::{EmitError, Result};

/// Raw OA report size in bytes, identical for every layout.
pub const RAW_SIZE: usize = 256;

/// Accumulator layout of a raw OA report format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OaLayout {
    /// Haswell: 45 A counters, no GPU clock.
    A45B8C8,
    A32u40A4u32B8C8,
    /// ACM and MTL.
    A24u40A14u32B8C8,
    /// Render-context (OAR) reports with the default counter layout.
    OarA32u40A4u32B8C8,
}

impl OaLayout {
    /// Select the layout for a lower-cased chipset and optional sub-format.
    ///
    /// # Errors
    ///
    /// Fails for sub-formats other than `oa` and `oar`, and for `oar` on
    /// chipsets without a default layout.
    pub fn select(chipset: &str, sub_format: Option<&str>) -> Result<Self> {
        let base = if chipset == "hsw" {
            Self::A45B8C8
        } else if chipset.starts_with("acm") || chipset.starts_with("mtl") {
            Self::A24u40A14u32B8C8
        } else {
            Self::A32u40A4u32B8C8
        };
        match (base, sub_format) {
            (_, None | Some("oa")) => Ok(base),
            (Self::A32u40A4u32B8C8, Some("oar")) => Ok(Self::OarA32u40A4u32B8C8),
            (_, Some(sub_format)) => Err(EmitError::UnsupportedLayout {
                chipset: chipset.to_string(),
                sub_format: sub_format.to_string(),
            }),
        }
    }

    /// `I915_*_FORMAT_*` constant.
    #[must_use]
    pub const fn format(self) -> &'static str {
        match self {
            Self::A45B8C8 => "I915_OA_FORMAT_A45_B8_C8",
            Self::A32u40A4u32B8C8 => "I915_OA_FORMAT_A32u40_A4u32_B8_C8",
            Self::A24u40A14u32B8C8 => "I915_OA_FORMAT_A24u40_A14u32_B8_C8",
            Self::OarA32u40A4u32B8C8 => "I915_OAR_FORMAT_A32u40_A4u32_B8_C8",
        }
    }

    /// Accumulator index of the GPU clock, if the format reports one.
    #[must_use]
    pub const fn gpu_clock_offset(self) -> Option<usize> {
        match self {
            Self::A45B8C8 => None,
            _ => Some(1),
        }
    }

    #[must_use]
    pub const fn a_offset(self) -> usize {
        match self {
            Self::A45B8C8 => 1,
            _ => 2,
        }
    }

    /// Number of A counters.
    #[must_use]
    pub const fn a_count(self) -> usize {
        match self {
            Self::A45B8C8 => 45,
            Self::A24u40A14u32B8C8 => 38,
            Self::A32u40A4u32B8C8 | Self::OarA32u40A4u32B8C8 => 36,
        }
    }

    /// Write the format and offset assignments, followed by a blank line.
    pub fn write(self, w: &mut CodeWriter) {
        w.line(format!("metric_set->perf_oa_format = {};", self.format()));
        w.blank();
        w.line(format!("metric_set->perf_raw_size = {RAW_SIZE};"));
        w.line("metric_set->gpu_time_offset = 0;");
        if let Some(offset) = self.gpu_clock_offset() {
            w.line(format!("metric_set->gpu_clock_offset = {offset};"));
        }
        w.line(format!("metric_set->a_offset = {};", self.a_offset()));
        w.line(format!(
            "metric_set->b_offset = metric_set->a_offset + {};",
            self.a_count()
        ));
        w.line("metric_set->c_offset = metric_set->b_offset + 8;");
        w.line("metric_set->perfcnt_offset = metric_set->c_offset + 8;");
        w.blank();
    }
}
