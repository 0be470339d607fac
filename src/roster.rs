//! # Roster
//! Employee records and the CSV loader that feeds a run.
//!
//! The roster is loaded once per invocation and treated as immutable. A
//! missing roster file is fatal; nothing can proceed without identities.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// One employee as loaded from the roster CSV.
///
/// `key` is the opaque identifier the timesheet source knows the employee
/// by; `code` is the company-internal employee number used for dedup
/// markers and the opt-in lists.
#[derive(Debug, Clone, Deserialize)]
pub struct Employee {
    pub code: String,
    pub key: String,
    pub last_name: String,
    pub first_name: String,
    pub division_code: String,
    #[serde(default)]
    pub email: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }

    /// Contact address for self notification, if the roster has one.
    pub fn contact(&self) -> Option<&str> {
        let addr = self.email.trim();
        (!addr.is_empty()).then_some(addr)
    }
}

/// Load the full roster. Header names match the `Employee` field names.
pub fn load_employees(path: &Path) -> Result<Vec<Employee>> {
    if !path.exists() {
        bail!("employee roster not found: {}", path.display());
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening roster {}", path.display()))?;

    let mut employees = Vec::new();
    for row in reader.deserialize() {
        let employee: Employee = row.context("parsing roster row")?;
        employees.push(employee);
    }
    Ok(employees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_roster_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "code,key,last_name,first_name,division_code,email\n\
             1001,k-abc,Sato,Hanako,A01,hanako@example.com\n\
             1002,k-def,Suzuki,Taro,B02,"
        )
        .unwrap();

        let employees = load_employees(file.path()).unwrap();
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].full_name(), "Sato Hanako");
        assert_eq!(employees[0].contact(), Some("hanako@example.com"));
        assert_eq!(employees[1].contact(), None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_employees(Path::new("no/such/roster.csv")).unwrap_err();
        assert!(err.to_string().contains("roster not found"));
    }
}
