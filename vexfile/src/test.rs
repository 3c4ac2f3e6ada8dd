use super::*;

#[test]
fn write_read() {
    let path = std::env::temp_dir().join("vexfile_write_read.bc");

    let bytecode = vec![30, 27, 34, 50, 91, 83, 49, 5, 6, 134, 61, 2, 6, 239, 34, 8, 15];

    write_file(&path, &bytecode).unwrap();
    let read_back = read_file(&path).unwrap();

    assert_eq!(bytecode, read_back);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn file_has_no_framing_overhead() {
    let path = std::env::temp_dir().join("vexfile_no_framing.bc");
    let bytecode = vec![1, 2, 3, 4, 5];

    write_file(&path, &bytecode).unwrap();
    let on_disk = std::fs::metadata(&path).unwrap().len();

    assert_eq!(on_disk, bytecode.len() as u64);

    std::fs::remove_file(&path).unwrap();
}
