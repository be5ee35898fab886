#[cfg(test)]
mod delete_tests {
    use imgbb_uploader_lib::storage::history::SqliteHistory;
    use imgbb_uploader_lib::utils::browser::{SystemBrowser, UrlOpener};
    use imgbb_uploader_lib::utils::notification::Notifier;
    use imgbb_uploader_lib::{ImgurUploader, UploadEvent, UploaderConfig};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc::UnboundedReceiver;

    struct FakeBrowser {
        fail: bool,
        opened: Mutex<Vec<String>>,
    }

    impl UrlOpener for FakeBrowser {
        fn open_url(&self, url: &str) -> anyhow::Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            if self.fail {
                Err(anyhow::anyhow!("no browser available"))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn show_message(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    fn uploader(
        browser_fails: bool,
    ) -> (
        ImgurUploader,
        UnboundedReceiver<UploadEvent>,
        Arc<FakeBrowser>,
        Arc<RecordingNotifier>,
    ) {
        let browser = Arc::new(FakeBrowser {
            fail: browser_fails,
            opened: Mutex::new(Vec::new()),
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let history = Arc::new(SqliteHistory::in_memory(25).unwrap());

        let (uploader, events) = ImgurUploader::with_collaborators(
            UploaderConfig::default(),
            history,
            notifier.clone(),
            browser.clone(),
        )
        .unwrap();

        (uploader, events, browser, notifier)
    }

    #[test]
    fn test_delete_opens_deletion_page() {
        let (uploader, mut events, browser, notifier) = uploader(false);

        uploader.delete_image("", "tok1");

        assert_eq!(
            browser.opened.lock().unwrap().as_slice(),
            ["https://imgur.com/delete/tok1".to_string()]
        );
        assert_eq!(events.try_recv().unwrap(), UploadEvent::DeletionCompleted);
        assert!(events.try_recv().is_err());
        assert!(notifier.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delete_completes_when_browser_fails() {
        let (uploader, mut events, _browser, notifier) = uploader(true);

        uploader.delete_image("abc123.png", "tok1");

        assert_eq!(
            notifier.messages.lock().unwrap().as_slice(),
            ["Unable to open the URL.".to_string()]
        );
        assert_eq!(events.try_recv().unwrap(), UploadEvent::DeletionCompleted);
        assert!(events.try_recv().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_system_opener_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (uploader, mut events) = ImgurUploader::with_collaborators(
            UploaderConfig::default(),
            Arc::new(SqliteHistory::in_memory(25).unwrap()),
            notifier.clone(),
            Arc::new(SystemBrowser::with_program("false")),
        )
        .unwrap();

        uploader.delete_image("", "tok1");

        assert_eq!(
            notifier.messages.lock().unwrap().as_slice(),
            ["Unable to open the URL.".to_string()]
        );
        assert_eq!(events.try_recv().unwrap(), UploadEvent::DeletionCompleted);
    }

    #[test]
    fn test_delete_uses_configured_base() {
        let browser = Arc::new(FakeBrowser {
            fail: false,
            opened: Mutex::new(Vec::new()),
        });
        let config = UploaderConfig {
            delete_url_base: "https://example.test/delete/".to_string(),
            ..UploaderConfig::default()
        };

        let (uploader, _events) = ImgurUploader::with_collaborators(
            config,
            Arc::new(SqliteHistory::in_memory(25).unwrap()),
            Arc::new(RecordingNotifier::default()),
            browser.clone(),
        )
        .unwrap();

        uploader.delete_image("", "xyz");
        assert_eq!(
            browser.opened.lock().unwrap()[0],
            "https://example.test/delete/xyz"
        );
    }
}
