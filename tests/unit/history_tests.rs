#[cfg(test)]
mod history_tests {
    use imgbb_uploader_lib::storage::history::{History, SqliteHistory};
    use tempfile::tempdir;
    use tokio_test::assert_ok;

    const PNG_STUB: &[u8] = b"\x89PNG\r\n\x1a\nstub";

    #[test]
    fn test_save_and_list() {
        let history = SqliteHistory::in_memory(25).unwrap();

        let packed = history.pack_file_name("imgur", "tok1", "abc123.png");
        assert_ok!(history.save(PNG_STUB, &packed));

        let entries = history.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].packed_name, "imgur#tok1#abc123.png");
        assert_eq!(entries[0].provider, "imgur");
        assert_eq!(entries[0].delete_token, "tok1");
        assert_eq!(entries[0].file_name, "abc123.png");

        let image = history.load_image(&packed).unwrap();
        assert_eq!(image.as_deref(), Some(PNG_STUB));
    }

    #[test]
    fn test_list_is_newest_first_and_trimmed() {
        let history = SqliteHistory::in_memory(2).unwrap();

        for name in ["a.png", "b.png", "c.png"] {
            let packed = history.pack_file_name("imgur", "tok", name);
            history.save(PNG_STUB, &packed).unwrap();
        }

        let names: Vec<String> = history
            .list()
            .unwrap()
            .into_iter()
            .map(|entry| entry.file_name)
            .collect();
        assert_eq!(names, vec!["c.png".to_string(), "b.png".to_string()]);
    }

    #[test]
    fn test_separator_in_file_name_keeps_fields() {
        let history = SqliteHistory::in_memory(25).unwrap();

        let packed = history.pack_file_name("imgur", "tok1", "abc123.png#section");
        history.save(PNG_STUB, &packed).unwrap();

        let entry = history.get(&packed).unwrap().unwrap();
        assert_eq!(entry.provider, "imgur");
        assert_eq!(entry.delete_token, "tok1");
        assert_eq!(entry.file_name, "abc123.png_section");
    }

    #[test]
    fn test_zero_limit_keeps_everything() {
        let history = SqliteHistory::in_memory(0).unwrap();
        for i in 0..30 {
            history.save(PNG_STUB, &format!("imgur#tok#{}.png", i)).unwrap();
        }
        assert_eq!(history.list().unwrap().len(), 30);
    }

    #[test]
    fn test_get_and_remove() {
        let history = SqliteHistory::in_memory(25).unwrap();
        history.save(PNG_STUB, "imgur#tok1#abc123.png").unwrap();

        assert!(history.get("imgur#tok1#abc123.png").unwrap().is_some());
        assert!(history.get("imgur#other#abc123.png").unwrap().is_none());

        assert_eq!(history.remove("imgur#tok1#abc123.png").unwrap(), 1);
        assert!(history.get("imgur#tok1#abc123.png").unwrap().is_none());
        assert_eq!(history.remove("imgur#tok1#abc123.png").unwrap(), 0);
    }

    #[test]
    fn test_history_persists_on_disk() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("history.db");

        {
            let history = SqliteHistory::open(&db_path, 25).unwrap();
            history.save(PNG_STUB, "imgur#tok1#abc123.png").unwrap();
        }

        let reopened = SqliteHistory::open(&db_path, 25).unwrap();
        let entries = reopened.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].delete_token, "tok1");
    }
}
