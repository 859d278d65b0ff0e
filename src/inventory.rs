// Host inventory - flat host lists for batch execution

use std::collections::HashSet;
use std::path::Path;

use crate::output::errors::DroverError;

/// Parse a comma-separated host list. Entries are trimmed; empty entries
/// and duplicates are dropped, first occurrence wins.
pub fn parse_host_list(list: &str) -> Vec<String> {
    dedup_hosts(
        list.split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from),
    )
}

/// Load hosts from a file, one per line. A `#` starts a comment; blank
/// lines are skipped.
pub fn load_hosts_file(path: &Path) -> Result<Vec<String>, DroverError> {
    let content = std::fs::read_to_string(path).map_err(|e| DroverError::Inventory {
        message: format!("failed to read hosts file {}: {}", path.display(), e),
    })?;

    Ok(dedup_hosts(
        content
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty())
            .map(String::from),
    ))
}

/// Drop duplicate hosts, preserving first-seen order.
pub fn dedup_hosts(hosts: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    hosts
        .into_iter()
        .filter(|host| seen.insert(host.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_comma_list() {
        assert_eq!(
            parse_host_list("h1, h2 ,h3"),
            vec!["h1".to_string(), "h2".to_string(), "h3".to_string()]
        );
    }

    #[test]
    fn test_parse_drops_empties_and_duplicates() {
        assert_eq!(
            parse_host_list("h1,,h2,h1, "),
            vec!["h1".to_string(), "h2".to_string()]
        );
    }

    #[test]
    fn test_load_hosts_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# cluster hosts").unwrap();
        writeln!(file, "h1").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "h2  # staging").unwrap();
        writeln!(file, "h1").unwrap();

        let hosts = load_hosts_file(file.path()).unwrap();
        assert_eq!(hosts, vec!["h1".to_string(), "h2".to_string()]);
    }

    #[test]
    fn test_missing_file_is_an_inventory_error() {
        let err = load_hosts_file(Path::new("/no/such/hosts")).unwrap_err();
        assert!(err.to_string().contains("hosts"));
    }
}
