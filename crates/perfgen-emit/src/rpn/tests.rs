use perfgen_model::{Generation, MetricSet};

use super::*;
use crate::{CodeWriter, EmitError};

fn generation(counters: &[(&str, &str)]) -> Generation {
    let counters: Vec<String> = counters
        .iter()
        .map(|(symbol, equation)| {
            format!(
                r#"    <counter symbol_name="{symbol}" name="{symbol} name" equation="{equation}"
             data_type="uint64" semantic_type="event" units="events" mdapi_group="GPU"/>"#
            )
        })
        .collect();
    let xml = format!(
        r#"<metrics>
  <set chipset="TGLGT1" name="Render Metrics Basic" symbol_name="RenderBasic"
       underscore_name="render_basic" hw_config_guid="1e3f0ba6-8b1e-4a9c-bf6c-0b36a5f45a4a">
{}
  </set>
</metrics>"#,
        counters.join("\n")
    );
    Generation::parse(&xml, "test.xml").unwrap()
}

fn set(generation: &Generation) -> &MetricSet {
    &generation.sets()[0]
}

fn compile(generation: &Generation, equation: &str) -> Result<CompiledEquation, EmitError> {
    let set = set(generation);
    compile_equation(set, &set.counters()[0], equation)
}

fn lines(compiled: &CompiledEquation) -> Vec<String> {
    compiled.stmts.iter().map(ToString::to_string).collect()
}

#[test]
fn test_op_tables() {
    for op in Op::ALL {
        assert_eq!(Op::from_mnemonic(op.mnemonic()), Some(op));
    }
    for op in CondOp::ALL {
        assert_eq!(CondOp::from_mnemonic(op.mnemonic()), Some(op));
    }
    assert_eq!(Op::ReadReg.arity(), 1);
    assert_eq!(Op::UDiv.arity(), 2);
    assert_eq!(Op::FAdd.result_type(), CType::Double);
    assert_eq!(Op::UAdd.result_type(), CType::U64);
    assert_eq!(Op::from_mnemonic("read"), None);
    assert_eq!(CondOp::Ugte.c_operator(), ">=");
}

#[test]
fn test_operand_order() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let compiled = compile(&g, "10 3 USUB").unwrap();
    assert_eq!(lines(&compiled), ["uint64_t tmp0 = 10 - 3;"]);
    assert_eq!(compiled.ret, Operand::Temp(0));
}

#[test]
fn test_read_lowercases_block() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let compiled = compile(&g, "A 7 READ").unwrap();
    assert_eq!(
        lines(&compiled),
        ["uint64_t tmp0 = accumulator[metric_set->a_offset + 7];"]
    );
}

#[test]
fn test_guarded_divisions() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);

    let compiled = compile(&g, "6 2 UDIV").unwrap();
    assert_eq!(
        lines(&compiled),
        [
            "uint64_t tmp0 = 6;",
            "uint64_t tmp1 = 2;",
            "uint64_t tmp2 = tmp1 ? tmp0 / tmp1 : 0;",
        ]
    );

    let compiled = compile(&g, "1 4 FDIV").unwrap();
    assert_eq!(
        lines(&compiled),
        [
            "double tmp0 = 1;",
            "double tmp1 = 4;",
            "double tmp2 = tmp1 ? tmp0 / tmp1 : 0;",
        ]
    );
    assert_eq!(compiled.ret, Operand::Temp(2));
}

#[test]
fn test_min_max() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let compiled = compile(&g, "5 9 UMIN 2 FMAX").unwrap();
    assert_eq!(
        lines(&compiled),
        [
            "uint64_t tmp0 = MIN(5, 9);",
            "double tmp1 = tmp0;",
            "double tmp2 = 2;",
            "double tmp3 = MAX(tmp1, tmp2);",
        ]
    );
}

#[test]
fn test_shifts_and_mask() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let compiled = compile(&g, "1 4 << 0xff AND 2 >>").unwrap();
    assert_eq!(
        lines(&compiled),
        [
            "uint64_t tmp0 = 1 << 4;",
            "uint64_t tmp1 = tmp0 & 0xff;",
            "uint64_t tmp2 = tmp1 >> 2;",
        ]
    );
}

#[test]
fn test_read_reg_is_zero() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let compiled = compile(&g, "0x1234 READ_REG").unwrap();
    assert_eq!(lines(&compiled), ["uint64_t tmp0 = 0;"]);
}

#[test]
fn test_single_token_equation() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let compiled = compile(&g, "$EuCoresTotalCount").unwrap();
    assert_eq!(compiled.temp_count(), 0);
    assert_eq!(compiled.ret.to_string(), "perf->devinfo.n_eus");
}

#[test]
fn test_hw_var_substitution() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let compiled = compile(&g, "GPU_TIME 0 READ 1000000000 UMUL $GpuTimestampFrequency UDIV").unwrap();
    let out = lines(&compiled);
    assert_eq!(out[0], "uint64_t tmp0 = accumulator[metric_set->gpu_time_offset + 0];");
    assert_eq!(out[1], "uint64_t tmp1 = tmp0 * 1000000000;");
    assert_eq!(out[3], "uint64_t tmp3 = perf->devinfo.timestamp_frequency;");
}

#[test]
fn test_counter_reference_calls_read_function() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ"), ("Busy", "$Clocks 2 UMUL")]);
    let set = set(&g);
    let busy = set.counter_by_var("$Busy").unwrap();
    let compiled = compile_equation(set, busy, &busy.equation).unwrap();
    assert_eq!(
        lines(&compiled),
        ["uint64_t tmp0 = tglgt1__render_basic__clocks__read(perf, metric_set, accumulator) * 2;"]
    );
}

#[test]
fn test_unresolved_variable() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let err = compile(&g, "$Nope 2 UMUL").unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, EmitError::UnresolvedVariable { .. }));
    assert!(message.contains("$Nope"));
    assert!(message.contains("Render Metrics Basic"));
    assert!(message.contains("Clocks name"));
    assert!(message.contains("\"$Nope 2 UMUL\""));
}

#[test]
fn test_malformed_equations() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    for equation in ["1 2", "", "1 UADD", "UADD", "1 2 3 READ"] {
        let err = compile(&g, equation).unwrap_err();
        assert!(
            matches!(err, EmitError::MalformedEquation { .. }),
            "{equation:?} gave {err}"
        );
    }
}

#[test]
fn test_read_requires_block_name() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let err = compile(&g, "1 2 UADD 0 READ").unwrap_err();
    assert!(err.to_string().contains("READ expects an accumulator block name"));
}

#[test]
fn test_write_equation() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let compiled = compile(&g, "10 3 USUB").unwrap();
    let mut w = CodeWriter::new(false);
    w.indent(4);
    write_equation(&mut w, &compiled);
    assert_eq!(
        w.output(),
        "    /* RPN equation: 10 3 USUB */\n    uint64_t tmp0 = 10 - 3;\n\n    return tmp0;\n"
    );
}

#[test]
fn test_splice_comparison() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let cond = splice_expression(set(&g), "Clocks", "$GpuTimestampFrequency 500 UGTE").unwrap();
    assert_eq!(cond.render(), "perf->devinfo.timestamp_frequency >= 500");
    assert_eq!(cond.guard_lines(), ["perf->devinfo.timestamp_frequency >= 500"]);
}

#[test]
fn test_splice_nested_brackets() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let cond = splice_expression(
        set(&g),
        "Clocks",
        "$SliceMask 0x1 AND $SkuRevisionId 2 ULT &&",
    )
    .unwrap();
    assert_eq!(
        cond.render(),
        "(perf->devinfo.slice_mask & 0x1) && (perf->devinfo.revision < 2)"
    );
    assert_eq!(
        cond.guard_lines(),
        ["(perf->devinfo.slice_mask & 0x1)", "(perf->devinfo.revision < 2)"]
    );
}

#[test]
fn test_splice_bare_variable() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let cond = splice_expression(set(&g), "Clocks", "$QueryMode").unwrap();
    assert_eq!(cond, Cond::Leaf(Operand::HwVar(perfgen_model::hw_vars::lookup("$QueryMode").unwrap())));
}

#[test]
fn test_splice_rejects_counters() {
    let g = generation(&[("Clocks", "GPU_CLOCK 0 READ")]);
    let err = splice_expression(set(&g), "Clocks", "$Clocks 1 UGTE").unwrap_err();
    assert!(matches!(err, EmitError::CounterInExpression { .. }));

    let err = splice_expression(set(&g), "Clocks", "$Missing 1 UGTE").unwrap_err();
    assert!(matches!(err, EmitError::UnresolvedVariable { .. }));

    let err = splice_expression(set(&g), "Clocks", "1 UGTE").unwrap_err();
    assert!(matches!(err, EmitError::MalformedEquation { .. }));
}
