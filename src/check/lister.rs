//! 客户端目录枚举

use crate::utils::{Result, WatchError};
use std::path::Path;
use tracing::{info, warn};

/// 列出 base 下的客户端目录名，按字典序排序
/// base 不存在时返回空列表；存在但无法读取则视为致命错误
pub fn list_clients(base_directory: &Path) -> Result<Vec<String>> {
    if !base_directory.exists() {
        warn!(path = %base_directory.display(), "base directory does not exist");
        return Ok(vec![]);
    }

    let list_err = |source| WatchError::ListClients {
        path: base_directory.to_path_buf(),
        source,
    };

    let mut clients = Vec::new();
    for entry in std::fs::read_dir(base_directory).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;

        // 跟随符号链接判断是否为目录
        if !entry.path().is_dir() {
            continue;
        }

        // 非 UTF-8 名称也要出现在结果里，后续会因路径不匹配报 NotFound
        match entry.file_name().into_string() {
            Ok(name) => clients.push(name),
            Err(raw) => {
                warn!(name = ?raw, "client directory name is not valid UTF-8");
                clients.push(raw.to_string_lossy().into_owned());
            }
        }
    }

    clients.sort();
    info!(count = clients.len(), path = %base_directory.display(), "client directories found");
    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lists_only_directories_sorted() {
        let tmp = TempDir::new().unwrap();
        for name in ["zeta", "acme", "Globex", "mid"] {
            fs::create_dir(tmp.path().join(name)).unwrap();
        }
        fs::write(tmp.path().join("notes.txt"), "not a client").unwrap();

        let clients = list_clients(tmp.path()).unwrap();
        assert_eq!(clients, ["Globex", "acme", "mid", "zeta"]);
    }

    #[test]
    fn dot_prefixed_directories_are_clients() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".acme")).unwrap();
        fs::create_dir(tmp.path().join("globex")).unwrap();

        let clients = list_clients(tmp.path()).unwrap();
        assert_eq!(clients, [".acme", "globex"]);
    }

    #[test]
    fn missing_base_is_empty() {
        let tmp = TempDir::new().unwrap();
        let clients = list_clients(&tmp.path().join("absent")).unwrap();
        assert!(clients.is_empty());
    }

    #[test]
    fn base_that_is_a_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("base");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            list_clients(&file),
            Err(WatchError::ListClients { .. })
        ));
    }
}
