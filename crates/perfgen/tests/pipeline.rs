use std::fs;
use std::path::{Path, PathBuf};

use perfgen::{EmitConfig, EquationsJob, Error, MetricSetsJob, ModelError};
use tempfile::TempDir;

const TGL: &str = r#"<?xml version="1.0"?>
<metrics>
  <set chipset="TGLGT1" name="Render Metrics Basic" symbol_name="RenderBasic"
       underscore_name="render_basic" hw_config_guid="1e3f0ba6-8b1e-4a9c-bf6c-0b36a5f45a4a">
    <counter symbol_name="GpuTime" name="GPU Time Elapsed" description="Time elapsed on the GPU."
             equation="GPU_TIME 0 READ 1000000000 UMUL $GpuTimestampFrequency UDIV"
             max_equation="$GpuTimestampFrequency 1000 UMUL"
             data_type="uint64" semantic_type="duration" units="ns" mdapi_group="GPU"/>
    <counter symbol_name="GpuCoreClocks" name="GPU Core Clocks" description="Core clocks."
             equation="GPU_CLOCK 0 READ" data_type="uint64" semantic_type="event"
             units="cycles" mdapi_group="GPU"/>
    <counter symbol_name="AvgGpuCoreFrequency" name="AVG GPU Core Frequency"
             equation="$GpuCoreClocks 1000000000 UMUL $GpuTime UDIV"
             max_equation="$GpuMaxFrequency"
             data_type="uint64" semantic_type="event" units="hz" mdapi_group="GPU"/>
    <counter symbol_name="GpuBusy" name="GPU Busy" description="GPU busy percentage."
             equation="A 0 READ 100 UMUL $GpuCoreClocks FDIV" max_equation="100"
             availability="$GpuTimestampFrequency 500 UGTE"
             data_type="float" semantic_type="duration" units="percent" mdapi_group="GPU"/>
  </set>
  <set chipset="TGLGT1" name="Compute Metrics Basic" symbol_name="ComputeBasic"
       underscore_name="compute_basic" hw_config_guid="2d3a0ba6-8b1e-4a9c-bf6c-0b36a5f45a4b">
    <counter symbol_name="GpuTime" name="GPU Time Elapsed" description="Time elapsed on the GPU."
             equation="GPU_TIME 0 READ 1000000000 UMUL $GpuTimestampFrequency UDIV"
             data_type="uint64" semantic_type="duration" units="ns" mdapi_group="GPU"/>
  </set>
</metrics>
"#;

const BROKEN: &str = r#"<metrics>
  <set chipset="TGLGT1" name="Render Metrics Basic" symbol_name="RenderBasic"
       underscore_name="render_basic" hw_config_guid="1e3f0ba6-8b1e-4a9c-bf6c-0b36a5f45a4a">
    <counter symbol_name="GpuBusy" name="GPU Busy" equation="A 0 READ $NoSuchCounter UMUL"
             data_type="uint64" semantic_type="event" units="events" mdapi_group="GPU"/>
  </set>
</metrics>
"#;

fn write_xml(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn equations_job(dir: &TempDir, xml_files: Vec<PathBuf>) -> EquationsJob {
    EquationsJob {
        header: dir.path().join("i915_perf_equations.h"),
        code: dir.path().join("i915_perf_equations.c"),
        xml_files,
        config: EmitConfig::default(),
    }
}

fn metric_sets_job(dir: &TempDir, xml_file: PathBuf) -> MetricSetsJob {
    MetricSetsJob {
        header: dir.path().join("i915_perf_metrics_tglgt1.h"),
        code: dir.path().join("i915_perf_metrics_tglgt1.c"),
        equations_include: PathBuf::from("i915_perf_equations.h"),
        registers_include: PathBuf::from("i915_perf_registers_tglgt1.h"),
        xml_file,
        sub_format: None,
        config: EmitConfig::default(),
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_generate_equations() {
    let dir = TempDir::new().unwrap();
    let xml = write_xml(&dir, "oa-tglgt1.xml", TGL);
    let job = equations_job(&dir, vec![xml]);

    let summary = perfgen::generate_equation_files(&job).unwrap();
    assert_eq!(summary.generations, 1);
    assert_eq!(summary.sets, 2);
    assert_eq!(summary.counters, 5);

    let code = read(&job.code);
    let header = read(&job.header);
    assert!(code.contains("#include \"i915_perf_equations.h\""));
    assert!(code.contains("uint64_t\ntglgt1__render_basic__gpu_time__read("));
    assert!(code.contains("tglgt1__render_basic__gpu_core_clocks__read(perf, metric_set, accumulator) * 1000000000"));
    assert!(code.contains("double\ntglgt1__render_basic__gpu_busy__read("));
    assert!(code.contains("uint64_t\ntglgt1__render_basic__gpu_time__max("));

    // The compute set's GpuTime is structurally identical to the render one.
    assert!(!code.contains("tglgt1__compute_basic__gpu_time__read("));
    assert!(header.contains(
        "#define tglgt1__compute_basic__gpu_time__read \\\n    tglgt1__render_basic__gpu_time__read\n"
    ));
    assert!(header.starts_with("/* Autogenerated file, DO NOT EDIT manually!"));
    assert!(header.ends_with("#endif /* __I915_PERF_EQUATIONS_H__ */\n"));
}

#[test]
fn test_generate_metric_sets() {
    let dir = TempDir::new().unwrap();
    let xml = write_xml(&dir, "oa-tglgt1.xml", TGL);
    let job = metric_sets_job(&dir, xml);

    let summary = perfgen::generate_metric_set_files(&job).unwrap();
    assert_eq!(summary.outputs, vec![job.header.clone(), job.code.clone()]);

    let code = read(&job.code);
    assert!(code.contains("#include \"i915_perf_registers_tglgt1.h\""));
    assert!(code.contains("metric_set->perf_oa_format = I915_OA_FORMAT_A32u40_A4u32_B8_C8;"));
    assert!(code.contains("static bool\ntglgt1__render_basic__gpu_busy__available(const struct intel_perf *perf)"));
    assert!(code.contains("    return perf->devinfo.timestamp_frequency >= 500;"));
    assert!(code.contains("    counter->max_float = percentage_max_callback_float;"));
    assert!(code.contains("    counter->max_uint64 = tglgt1__render_basic__avg_gpu_core_frequency__max;"));
    assert!(code.contains("    tglgt1_add_compute_basic_metric_set(perf);\n"));

    // Sorted by symbol name: AvgGpuCoreFrequency, GpuBusy, GpuCoreClocks, GpuTime.
    let order: Vec<usize> = ["AvgGpuCoreFrequency", "GpuBusy", "GpuCoreClocks", "GpuTime"]
        .iter()
        .map(|s| code.find(&format!("counter->symbol_name = \"{s}\";")).unwrap())
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]));

    let header = read(&job.header);
    assert!(header.contains("void intel_perf_load_metrics_tglgt1(struct intel_perf *perf);"));
}

#[test]
fn test_oar_metric_sets() {
    let dir = TempDir::new().unwrap();
    let xml = write_xml(&dir, "oa-tglgt1.xml", TGL);
    let mut job = metric_sets_job(&dir, xml);
    job.sub_format = Some("oar".to_string());
    perfgen::generate_metric_set_files(&job).unwrap();
    assert!(read(&job.code).contains("I915_OAR_FORMAT_A32u40_A4u32_B8_C8"));

    job.sub_format = Some("bogus".to_string());
    let err = perfgen::generate_metric_set_files(&job).unwrap_err();
    assert!(matches!(err, Error::Emit(_)));
    assert!(!job.code.exists());
    assert!(!job.header.exists());
}

#[test]
fn test_undefined_symbol_aborts_without_output() {
    let dir = TempDir::new().unwrap();
    let good = write_xml(&dir, "oa-tglgt1.xml", TGL);
    let broken = write_xml(&dir, "oa-broken.xml", BROKEN);
    let job = equations_job(&dir, vec![good, broken]);

    // Outputs from an earlier run must not survive a failed one.
    fs::write(&job.header, "stale").unwrap();
    fs::write(&job.code, "stale").unwrap();

    let err = perfgen::generate_equation_files(&job).unwrap_err();
    assert!(matches!(
        err,
        Error::Model(ModelError::UnresolvedReference { .. })
    ));
    let message = err.to_string();
    assert!(message.contains("$NoSuchCounter"), "{message}");
    assert!(message.contains("Render Metrics Basic"), "{message}");
    assert!(message.contains("GPU Busy"), "{message}");
    assert!(message.contains("A 0 READ $NoSuchCounter UMUL"), "{message}");

    assert!(!job.header.exists());
    assert!(!job.code.exists());
}

#[test]
fn test_missing_input_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let job = equations_job(&dir, vec![dir.path().join("missing.xml")]);
    let err = perfgen::generate_equation_files(&job).unwrap_err();
    assert!(err.is_usage());
    assert!(!job.code.exists());
}

#[test]
fn test_check() {
    let dir = TempDir::new().unwrap();
    let xml = write_xml(&dir, "oa-tglgt1.xml", TGL);

    let report = perfgen::check(std::slice::from_ref(&xml), None).unwrap();
    assert_eq!(report.summary.counters, 5);
    // Five read equations plus two max equations; the percentage max has none.
    assert_eq!(report.equations, 7);
    assert_eq!(report.guards, 1);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_check_rejects_unknown_block() {
    let dir = TempDir::new().unwrap();
    let xml = write_xml(
        &dir,
        "oa-typo.xml",
        &TGL.replace("GPU_CLOCK 0 READ", "GPU_CLOCKS 0 READ"),
    );
    let err = perfgen::check(&[xml], None).unwrap_err();
    assert!(matches!(err, Error::Eval { .. }), "{err}");
    assert!(err.to_string().contains("GPU Core Clocks"));
}
