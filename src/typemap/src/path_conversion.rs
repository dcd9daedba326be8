//! Path conversion related API
//!
//! Guest paths look like `device:/dir/file`.  These helpers split off the
//! device prefix and normalize the remainder so every backend sees the same
//! shape of path.

/// Split `path` at its first `:`.  The device part keeps the colon.
///
/// `"ms0:/PSP/GAME"` gives `Some(("ms0:", "/PSP/GAME"))`; a path with no
/// colon gives `None`.
pub fn split_device(path: &str) -> Option<(&str, &str)> {
    let idx = path.find(':')?;
    Some((&path[..=idx], &path[idx + 1..]))
}

/// Normalize a device-relative path: collapse repeated separators, drop
/// `.` components and resolve `..` without climbing above the root.  The
/// result always starts with `/`; the root itself is `"/"`.
pub fn normpath(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for comp in path.split(|c| c == '/' || c == '\\') {
        match comp {
            // empty comes from leading/trailing or doubled separators
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(comp),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Join a relative path onto a device-relative directory and normalize.
pub fn join_relative(dir: &str, rel: &str) -> String {
    if rel.starts_with('/') {
        normpath(rel)
    } else {
        normpath(&format!("{dir}/{rel}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split() {
        assert_eq!(split_device("ms0:/PSP"), Some(("ms0:", "/PSP")));
        assert_eq!(split_device("flash0:"), Some(("flash0:", "")));
        assert_eq!(split_device("host0:/a:b"), Some(("host0:", "/a:b")));
        assert_eq!(split_device("relative/file"), None);
    }

    #[test]
    fn normalize() {
        assert_eq!(normpath(""), "/");
        assert_eq!(normpath("/"), "/");
        assert_eq!(normpath("PSP//SAVEDATA/"), "/PSP/SAVEDATA");
        assert_eq!(normpath("/PSP/./GAME/../SAVEDATA"), "/PSP/SAVEDATA");
        assert_eq!(normpath("/../../x"), "/x");
    }

    #[test]
    fn join() {
        assert_eq!(join_relative("/PSP", "GAME/EBOOT.PBP"), "/PSP/GAME/EBOOT.PBP");
        assert_eq!(join_relative("/PSP", "/other"), "/other");
        assert_eq!(join_relative("/PSP/GAME", ".."), "/PSP");
    }
}
