use anyhow::Result;
use repo_packager_core::AppError;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Sends the finished document to `output_path`, or to stdout when unset.
pub fn emit_document(content: &str, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            write_to_file(path, content)?;
            println!("Output written to {}", path.display());
        }
        None => write_to_stdout(content)?,
    }
    Ok(())
}

fn write_to_file(path: &Path, content: &str) -> Result<()> {
    let file_write_error = |source: io::Error| AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(file_write_error)?;
    }
    let mut file = File::create(path).map_err(file_write_error)?;
    file.write_all(content.as_bytes()).map_err(file_write_error)?;
    log::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .and_then(|()| handle.flush())
        .map_err(|source| AppError::FileWrite {
            path: "<stdout>".into(),
            source,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_file_and_creates_parent_directories() {
        let tmp = TempDir::new().expect("tmp dir");
        let target = tmp.path().join("out/nested/context.md");
        emit_document("# Repository Context\n", Some(&target)).expect("write");
        assert_eq!(
            fs::read_to_string(&target).expect("read back"),
            "# Repository Context\n"
        );
    }

    #[test]
    fn unwritable_target_is_file_write_error() {
        let tmp = TempDir::new().expect("tmp dir");
        fs::write(tmp.path().join("blocker"), "").expect("write");
        let err = emit_document("x", Some(&tmp.path().join("blocker/context.md"))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::FileWrite { .. })
        ));
    }
}
