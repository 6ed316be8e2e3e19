//! Hardware-derived variables that equations may reference.
//!
//! Each `$Name` resolves to a field of the runtime `intel_perf` device info
//! instead of another counter. The table is identical for every chipset.

/// A hardware variable usable from RPN equations and availability expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HwVar {
    /// Token as it appears in equations, including the `$` prefix.
    pub name: &'static str,
    /// C expression the token is replaced with.
    pub c_expr: &'static str,
}

pub static HW_VARS: &[HwVar] = &[
    HwVar {
        name: "$EuCoresTotalCount",
        c_expr: "perf->devinfo.n_eus",
    },
    HwVar {
        name: "$EuSlicesTotalCount",
        c_expr: "perf->devinfo.n_eu_slices",
    },
    HwVar {
        name: "$EuSubslicesTotalCount",
        c_expr: "perf->devinfo.n_eu_sub_slices",
    },
    HwVar {
        name: "$EuThreadsCount",
        c_expr: "perf->devinfo.eu_threads_count",
    },
    HwVar {
        name: "$SliceMask",
        c_expr: "perf->devinfo.slice_mask",
    },
    HwVar {
        name: "$DualSubsliceMask",
        c_expr: "perf->devinfo.subslice_mask",
    },
    HwVar {
        name: "$SubsliceMask",
        c_expr: "perf->devinfo.subslice_mask",
    },
    HwVar {
        name: "$GpuTimestampFrequency",
        c_expr: "perf->devinfo.timestamp_frequency",
    },
    HwVar {
        name: "$GpuMinFrequency",
        c_expr: "perf->devinfo.gt_min_freq",
    },
    HwVar {
        name: "$GpuMaxFrequency",
        c_expr: "perf->devinfo.gt_max_freq",
    },
    HwVar {
        name: "$SkuRevisionId",
        c_expr: "perf->devinfo.revision",
    },
    HwVar {
        name: "$QueryMode",
        c_expr: "perf->devinfo.query_mode",
    },
];

/// Look up a hardware variable by its `$`-prefixed token.
#[must_use]
pub fn lookup(token: &str) -> Option<&'static HwVar> {
    HW_VARS.iter().find(|var| var.name == token)
}
