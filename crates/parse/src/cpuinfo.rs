//! `/proc/cpuinfo` grammar.
//!
//! One record per `processor : N` stanza. x86 kernels print `vendor_id`,
//! `model name`, `flags` and friends; ARM kernels print `BogoMIPS` and
//! `Features` instead, which fill the same fields.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::ParseError;
use crate::fields::{parse_number, tokens, value_after_colon};
use crate::scanner::{self, FieldRule, Grammar, StartLine, no_context};

/// One logical processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorRecord {
    pub processor: u32,
    pub vendor: Option<String>,
    pub model_name: Option<String>,
    pub family: Option<u32>,
    pub model: Option<u32>,
    pub stepping: Option<u32>,
    /// Socket the processor sits in.
    pub physical_id: Option<u32>,
    pub core_id: Option<u32>,
    pub mhz: Option<f64>,
    pub bogomips: Option<f64>,
    pub flags: Vec<String>,
}

/// Decoded `/proc/cpuinfo`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub processors: Vec<ProcessorRecord>,
    pub errors: Vec<ParseError>,
}

impl CpuInfo {
    /// Logical processors, i.e. `processor` stanzas.
    pub fn logical_count(&self) -> usize {
        self.processors.len()
    }

    /// Distinct sockets. Zero when the kernel reports no `physical id`.
    pub fn physical_count(&self) -> usize {
        self.processors
            .iter()
            .filter_map(|p| p.physical_id)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Model name of the first processor.
    pub fn model_name(&self) -> Option<&str> {
        self.processors.first()?.model_name.as_deref()
    }

    /// Long mode (`lm`) is advertised.
    pub fn is_64_bit(&self) -> bool {
        self.processors
            .first()
            .is_some_and(|p| p.flags.iter().any(|f| f == "lm"))
    }
}

/// Parses `/proc/cpuinfo` content.
pub fn parse_cpuinfo<I, S>(lines: I) -> CpuInfo
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let scan = scanner::scan(&CPUINFO, lines);
    CpuInfo {
        processors: scan.records,
        errors: scan.errors,
    }
}

static CPUINFO: Grammar<ProcessorRecord> = Grammar {
    name: "cpuinfo",
    context: no_context,
    start: cpuinfo_start,
    rules: CPUINFO_RULES,
};

/// Text before the first `:`, trimmed. Keys contain spaces and tabs.
fn key(line: &str) -> &str {
    line.split(':').next().unwrap_or_default().trim()
}

fn value(line: &str) -> &str {
    value_after_colon(line).unwrap_or_default()
}

fn number<T: std::str::FromStr>(line: &str) -> Result<T, String> {
    let text = value(line);
    parse_number(text).ok_or_else(|| format!("not a number: {text:?}"))
}

fn text(line: &str) -> Option<String> {
    Some(value(line).to_string()).filter(|v| !v.is_empty())
}

/// `processor	: 3`
fn cpuinfo_start(line: &str, _: &(), _ordinal: usize) -> StartLine<ProcessorRecord> {
    if key(line) != "processor" {
        return StartLine::No;
    }
    match number(line) {
        Ok(processor) => StartLine::Record(ProcessorRecord {
            processor,
            ..ProcessorRecord::default()
        }),
        Err(reason) => StartLine::Malformed(reason),
    }
}

static CPUINFO_RULES: &[FieldRule<ProcessorRecord>] = &[
    FieldRule {
        field: "vendor",
        matches: |line| key(line) == "vendor_id",
        apply: |line, cpu| {
            cpu.vendor = text(line);
            Ok(())
        },
    },
    FieldRule {
        field: "model_name",
        matches: |line| key(line) == "model name",
        apply: |line, cpu| {
            cpu.model_name = text(line);
            Ok(())
        },
    },
    FieldRule {
        field: "family",
        matches: |line| key(line) == "cpu family",
        apply: |line, cpu| {
            cpu.family = Some(number(line)?);
            Ok(())
        },
    },
    FieldRule {
        field: "model",
        matches: |line| key(line) == "model",
        apply: |line, cpu| {
            cpu.model = Some(number(line)?);
            Ok(())
        },
    },
    FieldRule {
        field: "stepping",
        matches: |line| key(line) == "stepping",
        apply: |line, cpu| {
            cpu.stepping = Some(number(line)?);
            Ok(())
        },
    },
    FieldRule {
        field: "physical_id",
        matches: |line| key(line) == "physical id",
        apply: |line, cpu| {
            cpu.physical_id = Some(number(line)?);
            Ok(())
        },
    },
    FieldRule {
        field: "core_id",
        matches: |line| key(line) == "core id",
        apply: |line, cpu| {
            cpu.core_id = Some(number(line)?);
            Ok(())
        },
    },
    FieldRule {
        field: "mhz",
        matches: |line| key(line) == "cpu MHz",
        apply: |line, cpu| {
            cpu.mhz = Some(finite(line)?);
            Ok(())
        },
    },
    FieldRule {
        field: "bogomips",
        matches: |line| key(line).eq_ignore_ascii_case("bogomips"),
        apply: |line, cpu| {
            cpu.bogomips = Some(finite(line)?);
            Ok(())
        },
    },
    FieldRule {
        field: "flags",
        matches: |line| matches!(key(line), "flags" | "Features"),
        apply: |line, cpu| {
            cpu.flags = tokens(value(line)).into_iter().map(str::to_string).collect();
            Ok(())
        },
    },
];

fn finite(line: &str) -> Result<f64, String> {
    let n: f64 = number(line)?;
    if n.is_finite() {
        Ok(n)
    } else {
        Err(format!("not finite: {n}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    const TWO_CORES: &str = "\
processor\t: 0
vendor_id\t: GenuineIntel
cpu family\t: 6
model\t\t: 142
model name\t: Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz
stepping\t: 10
cpu MHz\t\t: 1992.002
physical id\t: 0
core id\t\t: 0
flags\t\t: fpu vme de pse tsc msr pae mce lm constant_tsc
bogomips\t: 3984.00

processor\t: 1
vendor_id\t: GenuineIntel
cpu family\t: 6
model\t\t: 142
model name\t: Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz
stepping\t: 10
cpu MHz\t\t: 2400.117
physical id\t: 0
core id\t\t: 1
flags\t\t: fpu vme de pse tsc msr pae mce lm constant_tsc
bogomips\t: 3984.00
";

    #[test]
    fn x86_stanzas() {
        let info = parse_cpuinfo(TWO_CORES.lines());
        assert!(info.errors.is_empty(), "{:?}", info.errors);
        assert_eq!(info.logical_count(), 2);
        assert_eq!(info.physical_count(), 1);
        assert!(info.is_64_bit());
        assert_eq!(
            info.model_name(),
            Some("Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz")
        );

        let second = &info.processors[1];
        assert_eq!(second.processor, 1);
        assert_eq!(second.vendor.as_deref(), Some("GenuineIntel"));
        assert_eq!(second.family, Some(6));
        assert_eq!(second.model, Some(142));
        assert_eq!(second.stepping, Some(10));
        assert_eq!(second.core_id, Some(1));
        assert_eq!(second.mhz, Some(2400.117));
        assert_eq!(second.bogomips, Some(3984.0));
        assert_eq!(second.flags.len(), 10);
    }

    #[test]
    fn arm_stanzas_without_sockets() {
        let text = "\
processor\t: 0
BogoMIPS\t: 108.00
Features\t: fp asimd evtstrm crc32 cpuid
CPU implementer\t: 0x41

processor\t: 1
BogoMIPS\t: 108.00
Features\t: fp asimd evtstrm crc32 cpuid

Hardware\t: BCM2835
";
        let info = parse_cpuinfo(text.lines());
        assert_eq!(info.logical_count(), 2);
        assert_eq!(info.physical_count(), 0);
        assert!(!info.is_64_bit());
        assert_eq!(info.processors[0].bogomips, Some(108.0));
        assert_eq!(info.processors[1].flags, vec!["fp", "asimd", "evtstrm", "crc32", "cpuid"]);
        assert_eq!(info.model_name(), None);
    }

    #[test]
    fn bad_values_are_local() {
        let text = "\
processor\t: 0
cpu family\t: six
cpu MHz\t\t: NaN
model name\t: Mystery
processor\t: x
model name\t: Dropped
processor\t: 2
";
        let info = parse_cpuinfo(text.lines());
        let ids: Vec<_> = info.processors.iter().map(|p| p.processor).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(info.processors[0].family, None);
        assert_eq!(info.processors[0].mhz, None);
        assert_eq!(info.processors[0].model_name.as_deref(), Some("Mystery"));

        let kinds: Vec<_> = info.errors.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ParseErrorKind::FieldParse { field: "family" },
                ParseErrorKind::FieldParse { field: "mhz" },
                ParseErrorKind::MalformedRecord,
            ]
        );
    }

    #[test]
    fn model_is_not_model_name() {
        let info = parse_cpuinfo(["processor : 0", "model name : X", "model : 7"]);
        assert_eq!(info.processors[0].model, Some(7));
        assert_eq!(info.processors[0].model_name.as_deref(), Some("X"));
    }
}
