//! Shared pieces of generated files.

/// License banner placed at the top of every generated file.
pub(crate) fn gen_banner(generator: &str) -> String {
    format!(
        r#"/* Autogenerated file, DO NOT EDIT manually! generated by {generator}
 *
 * Copyright (c) 2018 Intel Corporation
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.  IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */
"#
    )
}

/// Include guard macro for a header base name: `perf_metrics.h` -> `PERF_METRICS_H`.
#[must_use]
pub fn include_guard(header_name: &str) -> String {
    header_name.replace('.', "_").to_uppercase()
}

/// Escape text for use inside a C string literal.
#[must_use]
pub fn c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_guard() {
        assert_eq!(include_guard("i915_perf_equations.h"), "I915_PERF_EQUATIONS_H");
    }

    #[test]
    fn test_c_string() {
        assert_eq!(c_string(r#"say "hi" \o/"#), r#"say \"hi\" \\o/"#);
        assert_eq!(c_string("plain"), "plain");
    }

    #[test]
    fn test_banner_names_generator() {
        assert!(gen_banner("perfgen").starts_with(
            "/* Autogenerated file, DO NOT EDIT manually! generated by perfgen\n"
        ));
    }
}
