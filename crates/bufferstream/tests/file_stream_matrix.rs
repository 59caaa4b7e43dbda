//! `FileStream` open modes and typed reads/writes against real files.

use std::fs;
use std::path::PathBuf;

use bufferstream::{FileStream, FileStreamOptions, SeekOrigin, StreamError};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bufferstream-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn create_makes_parent_directories() {
    let dir = scratch_dir("create");
    let path = dir.join("nested/deeper/data.bin");
    let mut stream = FileStream::open(&path, FileStreamOptions::read_write()).unwrap();
    stream.write(&42u32).unwrap();
    stream.flush().unwrap();
    drop(stream);
    assert_eq!(fs::metadata(&path).unwrap().len(), 4);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn write_then_reopen_big_endian() {
    let dir = scratch_dir("big-endian");
    let path = dir.join("record.bin");
    let options = FileStreamOptions::read_write().big_endian(true);

    let mut stream = FileStream::open(&path, options).unwrap();
    stream
        .write(&0xABCD_EF00u32)
        .unwrap()
        .write_array(&[1u16, 2])
        .unwrap()
        .write_string("name", true, 8)
        .unwrap()
        .pad(2)
        .unwrap();
    assert_eq!(stream.tell().unwrap(), 18);
    drop(stream);

    assert_eq!(&fs::read(&path).unwrap()[..4], &[0xAB, 0xCD, 0xEF, 0x00]);

    let mut stream = FileStream::open(&path, FileStreamOptions::read_only().big_endian(true)).unwrap();
    assert_eq!(stream.size().unwrap(), 18);
    assert_eq!(stream.read::<u32>().unwrap(), 0xABCD_EF00);
    assert_eq!(stream.read_vec::<u16>(2).unwrap(), vec![1, 2]);
    assert_eq!(stream.read_string_n(8, true).unwrap(), "name");
    assert_eq!(stream.read_bytes::<2>().unwrap(), [0, 0]);
    assert!(stream.read::<u8>().is_err());
    assert_eq!(stream.tell().unwrap(), 18);

    stream.seek(4, SeekOrigin::End).unwrap();
    assert_eq!(stream.read_string().unwrap(), "");
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn append_and_truncate() {
    let dir = scratch_dir("modes");
    let path = dir.join("log.bin");

    FileStream::open(&path, FileStreamOptions::read_write())
        .unwrap()
        .write_string("one", true, 0)
        .unwrap();
    FileStream::open(&path, FileStreamOptions::read_only().append(true).create(true))
        .unwrap()
        .write_string("two", true, 0)
        .unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"one\0two\0");

    let mut stream = FileStream::open(&path, FileStreamOptions::read_only()).unwrap();
    assert_eq!(stream.read_string().unwrap(), "one");
    assert_eq!(stream.read_string().unwrap(), "two");
    drop(stream);

    FileStream::open(&path, FileStreamOptions::read_write().truncate(true))
        .unwrap()
        .write(&7u8)
        .unwrap();
    assert_eq!(fs::read(&path).unwrap(), [7]);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_file_without_create_fails() {
    let dir = scratch_dir("missing");
    let err = FileStream::open(dir.join("absent.bin"), FileStreamOptions::read_only()).unwrap_err();
    assert!(matches!(err, StreamError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
}

#[test]
fn options_from_json() {
    let options: FileStreamOptions =
        serde_json::from_str(r#"{"write": true, "create": true, "big_endian": true}"#).unwrap();
    assert!(options.read);
    assert!(options.writes());
    assert_eq!(options, FileStreamOptions::read_write().big_endian(true));
}
