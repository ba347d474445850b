use std::path::Path;

use serde::Serialize;
use tokio::fs;

use crate::error::StencilError;

/// Serialises `data` as JSON into `path`.
pub async fn write_report<T>(path: &Path, data: &T, pretty: bool) -> Result<(), StencilError>
where
    T: Serialize + ?Sized,
{
    let encoded = if pretty {
        serde_json::to_vec_pretty(data)?
    } else {
        serde_json::to_vec(data)?
    };
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StencilError::io(parent, source))?;
    }
    fs::write(path, encoded)
        .await
        .map_err(|source| StencilError::io(path, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        count: usize,
    }

    #[tokio::test]
    async fn compact_and_pretty_output() {
        let dir = tempfile::tempdir().unwrap();
        let compact = dir.path().join("compact.json");
        let pretty = dir.path().join("reports/pretty.json");

        write_report(&compact, &Sample { count: 3 }, false).await.unwrap();
        write_report(&pretty, &Sample { count: 3 }, true).await.unwrap();

        assert_eq!(std::fs::read_to_string(&compact).unwrap(), r#"{"count":3}"#);
        assert!(std::fs::read_to_string(&pretty).unwrap().contains("\n  \"count\": 3"));
    }
}
