//! End-to-end import tests
//!
//! Files on disk through the whole pipeline: decoding, tokenizing, header
//! mapping, validation, then template and export round trips.

#[cfg(test)]
mod integration_tests {
    use crate::core::config::{ImportConfig, DEFAULT_TEMPLATE_FILE_NAME};
    use crate::core::export::export_users_csv;
    use crate::core::file_parser::{FileFormat, UserImporter};
    use crate::core::header_map::Field;
    use crate::core::models::{ImportError, UserStatus};
    use crate::core::template::{write_csv_template, EXAMPLE_ROW};
    use anyhow::Result;
    use encoding_rs::WINDOWS_1256;
    use futures::future;
    use std::{fs, path::PathBuf};
    use tempfile::tempdir;

    const HEADER: &str = "نام,ایمیل,تلفن,تلگرام,موجودی,وضعیت";

    /// Set of fixture files sharing one temporary directory
    struct TestFileSet {
        temp_dir: tempfile::TempDir,
        csv_lf: PathBuf,
        csv_crlf: PathBuf,
        csv_multiline: PathBuf,
        csv_mixed: PathBuf,
        csv_legacy: PathBuf,
    }

    impl TestFileSet {
        fn new() -> Result<Self> {
            let temp_dir = tempdir()?;
            let base_path = temp_dir.path();

            let lf_content = format!(
                "{HEADER}\nعلی محمدی,ali@example.com,09123456789,@ali_mohammadi,\"1,500\",فعال\nسارا کریمی,sara@example.com,0912 111 2233,sara_k,0,غیرفعال\n"
            );
            let csv_lf = base_path.join("users_lf.csv");
            fs::write(&csv_lf, &lf_content)?;

            let csv_crlf = base_path.join("users_crlf.csv");
            fs::write(&csv_crlf, lf_content.replace('\n', "\r\n"))?;

            let multiline_content = format!(
                "{HEADER}\r\n\"علی\r\nمحمدی\",ali@example.com,09123456789,ali,100,active\r\nرضا,reza@example.com,09351234567,reza,200,banned\r\n"
            );
            let csv_multiline = base_path.join("users_multiline.csv");
            fs::write(&csv_multiline, multiline_content)?;

            // English headers in another order, a blank line and broken rows
            let mixed_content = "Status,Balance,EMAIL,name,Phone,telegramid,notes\n\
                                 banned,-5,bad-email,A,123,bad id!,x\n\
                                 \n\
                                 ,,,,,,\n\
                                 1,\"2,000.75\",zahra@example.com,زهرا احمدی,۰۹۱۲۳۴۵۶۷۸۹,zahra,\n";
            let csv_mixed = base_path.join("users_mixed.csv");
            fs::write(&csv_mixed, mixed_content)?;

            let legacy_content = "name,email,phone,telegramId,balance,status\nحسن رضا زاده,hasan@example.com,09121234567,hasan_r,2500,مسدود\n";
            let (legacy_bytes, _, _) = WINDOWS_1256.encode(legacy_content);
            let csv_legacy = base_path.join("users_legacy.csv");
            fs::write(&csv_legacy, &*legacy_bytes)?;

            Ok(Self {
                temp_dir,
                csv_lf,
                csv_crlf,
                csv_multiline,
                csv_mixed,
                csv_legacy,
            })
        }
    }

    #[tokio::test]
    async fn test_crlf_and_lf_files_match() -> Result<()> {
        let files = TestFileSet::new()?;
        let importer = UserImporter::new();

        let (lf, _) = importer.import_file(&files.csv_lf).await?;
        let (crlf, _) = importer.import_file(&files.csv_crlf).await?;

        assert_eq!(lf.rows, crlf.rows);
        assert_eq!(lf.headers, crlf.headers);
        assert_eq!(lf.rows.len(), 2);
        assert!(lf.rows.iter().all(|r| r.is_valid), "{:?}", lf.rows);
        assert_eq!(lf.rows[0].data.balance, 1500.0);
        assert_eq!(lf.rows[1].data.status, UserStatus::Inactive);
        Ok(())
    }

    #[tokio::test]
    async fn test_multiline_cell_is_one_record() -> Result<()> {
        let files = TestFileSet::new()?;
        let (report, _) = UserImporter::new().import_file(&files.csv_multiline).await?;

        let numbers: Vec<usize> = report.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![2, 3]);
        assert_eq!(report.rows[0].data.name, "علی\nمحمدی");
        assert!(report.rows[0].is_valid, "{:?}", report.rows[0].errors);
        assert_eq!(report.rows[1].data.status, UserStatus::Banned);
        Ok(())
    }

    #[tokio::test]
    async fn test_mixed_file_reports_every_problem() -> Result<()> {
        let files = TestFileSet::new()?;
        let (report, stats) = UserImporter::new().import_file(&files.csv_mixed).await?;

        assert_eq!(report.headers.len(), 7);
        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.valid_rows, 1);
        assert_eq!(stats.invalid_rows, 1);

        let broken = &report.rows[0];
        assert_eq!(broken.row_number, 2);
        assert_eq!(broken.data.status, UserStatus::Banned);
        assert_eq!(broken.data.balance, -5.0);
        for field in ["name", "email", "phone", "telegramId", "balance"] {
            assert!(
                broken.errors.iter().any(|e| e.starts_with(&format!("{field}: "))),
                "missing {field} error in {:?}",
                broken.errors
            );
        }

        let good = &report.rows[1];
        assert_eq!(good.row_number, 5);
        assert!(good.is_valid, "{:?}", good.errors);
        assert_eq!(good.data.balance, 2000.75);
        assert_eq!(good.data.status, UserStatus::Active);
        assert_eq!(good.data.phone, "۰۹۱۲۳۴۵۶۷۸۹");
        Ok(())
    }

    #[tokio::test]
    async fn test_legacy_encoding_detected() -> Result<()> {
        let files = TestFileSet::new()?;
        let (report, stats) = UserImporter::new().import_file(&files.csv_legacy).await?;

        assert_ne!(stats.detected_encoding, "UTF-8");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].data.name, "حسن رضا زاده");
        assert_eq!(report.rows[0].data.status, UserStatus::Banned);
        assert!(report.rows[0].is_valid);
        Ok(())
    }

    #[tokio::test]
    async fn test_without_header_row() -> Result<()> {
        let files = TestFileSet::new()?;
        let mut config = ImportConfig::default();
        config.has_header = false;

        let (report, _) = UserImporter::with_config(config)
            .import_file(&files.csv_lf)
            .await?;

        // the header line becomes an invalid record
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].row_number, 1);
        assert!(!report.rows[0].is_valid);
        assert_eq!(report.headers[0], "نام");
        Ok(())
    }

    #[tokio::test]
    async fn test_template_written_and_imported() -> Result<()> {
        let dir = tempdir()?;
        let config = ImportConfig::default();
        let path = write_csv_template(dir.path(), &config.template_file_name)?;
        assert!(path.ends_with(DEFAULT_TEMPLATE_FILE_NAME));

        let (report, stats) = UserImporter::with_config(config).import_file(&path).await?;
        assert_eq!(stats.detected_encoding, "UTF-8");
        assert_eq!(report.headers, HEADER.split(',').collect::<Vec<_>>());
        assert_eq!(report.rows.len(), 1);

        let record = &report.rows[0];
        assert!(record.is_valid, "{:?}", record.errors);
        assert_eq!(record.row_number, 2);
        assert_eq!(record.data.name, EXAMPLE_ROW[0]);
        assert_eq!(record.data.telegram_id, EXAMPLE_ROW[3]);
        assert_eq!(record.data.balance, 100000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_export_valid_drafts() -> Result<()> {
        let files = TestFileSet::new()?;
        let (report, _) = UserImporter::new().import_file(&files.csv_mixed).await?;

        let drafts = report.valid_drafts();
        let text = export_users_csv(&drafts, &Field::ALL, true)?;
        let lines: Vec<&str> = text.split('\n').collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "\"نام\",\"ایمیل\",\"تلفن\",\"آیدی تلگرام\",\"موجودی\",\"وضعیت\""
        );
        assert_eq!(
            lines[1],
            "\"زهرا احمدی\",\"zahra@example.com\",\"۰۹۱۲۳۴۵۶۷۸۹\",\"zahra\",\"2000.75\",\"فعال\""
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_imports() -> Result<()> {
        let files = TestFileSet::new()?;
        let importer = UserImporter::new();

        let paths = [
            &files.csv_lf,
            &files.csv_crlf,
            &files.csv_multiline,
            &files.csv_mixed,
        ];
        let results = future::join_all(paths.iter().map(|p| importer.import_file(p))).await;

        let counts: Vec<usize> = results
            .into_iter()
            .map(|r| r.map(|(report, _)| report.rows.len()))
            .collect::<Result<_, _>>()?;
        assert_eq!(counts, vec![2, 2, 2, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn test_excel_workbook_import() -> Result<()> {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/users.xlsx");
        let (report, stats) = UserImporter::new().import_file(&path).await?;

        assert_eq!(stats.file_format, FileFormat::Excel);
        assert_eq!(report.headers, HEADER.split(',').collect::<Vec<_>>());

        // worksheet row 3 is empty
        let numbers: Vec<usize> = report.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![2, 4]);
        assert!(report.rows.iter().all(|r| r.is_valid), "{:?}", report.rows);

        let numeric_phone = &report.rows[0].data;
        assert_eq!(numeric_phone.name, "علی محمدی");
        assert_eq!(numeric_phone.phone, "9123456789");
        assert_eq!(numeric_phone.balance, 100000.0);

        let text_phone = &report.rows[1].data;
        assert_eq!(text_phone.phone, "09121112233");
        assert_eq!(text_phone.balance, 2500.5);
        assert_eq!(text_phone.status, UserStatus::Inactive);
        Ok(())
    }

    #[tokio::test]
    async fn test_broken_workbook_is_excel_error() -> Result<()> {
        let files = TestFileSet::new()?;
        let path = files.temp_dir.path().join("broken.xlsx");
        fs::write(&path, b"not a zip archive")?;

        let importer = UserImporter::new();
        assert_eq!(importer.detect_file_format(&path)?, FileFormat::Excel);
        let result = importer.import_file(&path).await;
        assert!(matches!(result, Err(ImportError::Excel(_))));
        Ok(())
    }

    #[test]
    fn test_blocking_import_from_sync_code() {
        let files = TestFileSet::new().unwrap();
        let importer = UserImporter::new();

        let (report, stats) = tokio_test::block_on(importer.import_file(&files.csv_lf)).unwrap();
        assert_eq!(stats.file_format, FileFormat::Csv);
        assert_eq!(report.summary().valid_rows, 2);
    }
}
