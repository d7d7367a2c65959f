//! Reader for Java-style `local.properties` files (`key=value`, `#` comments).
//!
//! Compiled into the build script, which bakes the API key into the binary.

pub fn read_property(contents: &str, key: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .find_map(|line| {
            let (k, v) = line.split_once(['=', ':'])?;
            (k.trim() == key).then(|| v.trim().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_key_among_comments_and_other_entries() {
        let contents = "\
            # local only, never committed\n\
            sdk.dir=/opt/android\n\
            weatherApiKey = abc123\n";

        assert_eq!(read_property(contents, "weatherApiKey").as_deref(), Some("abc123"));
        assert_eq!(read_property(contents, "sdk.dir").as_deref(), Some("/opt/android"));
    }

    #[test]
    fn colon_separator_is_accepted() {
        assert_eq!(read_property("weatherApiKey: k", "weatherApiKey").as_deref(), Some("k"));
    }

    #[test]
    fn missing_or_commented_key_is_none() {
        assert_eq!(read_property("#weatherApiKey=old\n", "weatherApiKey"), None);
        assert_eq!(read_property("", "weatherApiKey"), None);
    }
}
