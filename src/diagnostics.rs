//! Validation findings and the sink that accumulates them.
//!
//! Generation never aborts on a finding; every reachable diagnostic is
//! collected in a single pass and the caller decides what to do with them.
use std::fmt;
use std::slice;

/// Severity tiers. Malformed models that the model builder should have made
/// impossible are programmer errors, not diagnostics, and are not
/// represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The closed set of validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    HeaderOnInterfaceMustHaveValue,
    HeaderOnInterfaceMustNotHaveColonInName,
    HeaderPropertyNameMustContainColon,
    HeaderPropertyWithValueMustBeNullable,
    HeaderParameterMustNotHaveValue,
    AllowAnyStatusCodeNotAllowedOnParent,
    EventNotAllowed,
    MethodMustHaveRequestAttribute,
    MethodMustHaveValidReturnType,
    MultipleRequesterProperties,
    RequesterPropertyMustHaveZeroAttributes,
    PropertyMustBeReadOnly,
    PropertyMustBeReadWrite,
    PropertyMustHaveOneAttribute,
    MultiplePathPropertiesForKey,
    MissingPathPropertyForBasePathPlaceholder,
    MultiplePathParametersForKey,
    MissingPathPropertyOrParameterForPlaceholder,
    MissingPlaceholderForPathParameter,
    MultipleBodyParameters,
    MultipleCancellationTokenParameters,
    CancellationTokenMustHaveZeroAttributes,
    ParameterMustHaveZeroOrOneAttributes,
    QueryMapParameterIsNotADictionary,
    DuplicateRequestPropertyKey,
}

impl DiagnosticCode {
    pub fn severity(self) -> Severity {
        // every code in the current set is fatal for the interface
        Severity::Error
    }
}

/// One finding: the code, the offending entity, and a human-readable detail.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub subject: String,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:?}] {}: {}",
            self.severity, self.code, self.subject, self.detail
        )
    }
}

/// Accumulating sink for diagnostics. Reporting never fails and never stops
/// the pipeline; findings are kept in report order, which follows the
/// declaration order of the model.
#[derive(Debug, Default)]
pub struct Diagnostics {
    findings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { findings: vec![] }
    }

    pub fn report(&mut self, code: DiagnosticCode, subject: &str, detail: &str) {
        self.findings.push(Diagnostic {
            code,
            severity: code.severity(),
            subject: subject.to_string(),
            detail: detail.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> slice::Iter<'_, Diagnostic> {
        self.findings.iter()
    }

    /// All findings with the given code, in report order.
    pub fn with_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.findings.iter().filter(|d| d.code == code).collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.findings
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.findings.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_report_order_preserved() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(DiagnosticCode::EventNotAllowed, "event changed", "");
        diagnostics.report(
            DiagnosticCode::MethodMustHaveRequestAttribute,
            "method frob",
            "",
        );
        let codes: Vec<DiagnosticCode> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::EventNotAllowed,
                DiagnosticCode::MethodMustHaveRequestAttribute,
            ]
        );
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn test_display() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(
            DiagnosticCode::MultipleBodyParameters,
            "parameter b of method post",
            "a method can have at most one body parameter",
        );
        let rendered = format!("{}", diagnostics.iter().next().unwrap());
        assert!(rendered.starts_with("error [MultipleBodyParameters]"));
    }
}
