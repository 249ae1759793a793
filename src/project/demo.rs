use crate::config::DemoConfig;
use crate::error::{Error, Result};
use crate::storage::{DirectoryHandle, WritableFile};
use log::info;

/// Downloads the demo ontologies and writes them verbatim into
/// `<project>/<source_data_dir>` under `root`. Returns the written file names.
///
/// Everything is fetched before anything is written, so a failed download
/// leaves at most an empty demo project behind.
pub async fn provision_demo<D: DirectoryHandle>(
    root: &D,
    demo: &DemoConfig,
    source_data_dir: &str,
) -> Result<Vec<String>> {
    let client = reqwest::Client::new();
    let mut downloads = Vec::with_capacity(demo.sources.len());
    for (file_name, url) in &demo.sources {
        info!("Fetching {} from {}", file_name, url);
        let response = client.get(url.as_str()).send().await?;
        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "Response code for '{}' was not OK: {}",
                url,
                response.status()
            )));
        }
        downloads.push((file_name.clone(), response.bytes().await?.to_vec()));
    }
    write_demo_sources(root, &demo.project_name, source_data_dir, &downloads)
}

/// Writes already fetched demo files into the demo project.
pub fn write_demo_sources<D: DirectoryHandle>(
    root: &D,
    project_name: &str,
    source_data_dir: &str,
    files: &[(String, Vec<u8>)],
) -> Result<Vec<String>> {
    let project = root.get_directory(project_name, true)?;
    let source_data = project.get_directory(source_data_dir, true)?;

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        let mut writer = source_data.create_writable(name)?;
        if let Err(e) = writer.write(content) {
            let _ = writer.abort();
            return Err(e);
        }
        writer.close(None)?;
        written.push(name.clone());
    }
    info!("Demo project '{}' created with {} files", project_name, written.len());
    Ok(written)
}
