use super::*;

#[test]
fn test_bit_read_write() {
    let mut view = [0u8; 2];

    write_bit(&mut view, 1, 7, true);
    write_bit(&mut view, 1, 0, true);
    assert_eq!(view, [0x00, 0x81]);
    assert!(read_bit(&view, 1, 7));
    assert!(!read_bit(&view, 1, 6));

    write_bit(&mut view, 1, 7, false);
    assert_eq!(view, [0x00, 0x01]);
}

#[test]
fn test_masked_bits() {
    let mut view = [0b1010_0000u8];

    assert_eq!(read_bits(&view, 0, 0b1100_0000), 0b10);
    write_bits(&mut view, 0, 0b0001_1111, 31);
    assert_eq!(view[0], 0b1011_1111);
    write_bits(&mut view, 0, 0b1100_0000, 0b01);
    assert_eq!(view[0], 0b0111_1111);
    assert_eq!(read_bits(&view, 0, 0b0001_1111), 31);
    assert_eq!(read_bits(&view, 0, 0), 0);
}

#[test]
fn test_u24() {
    let mut view = [0u8; 4];
    write_u24(&mut view, 1, 0x12_3456);
    assert_eq!(view, [0x00, 0x12, 0x34, 0x56]);
    assert_eq!(read_u24(&view, 1), 0x12_3456);
}

#[test]
fn test_i24() {
    let tests = vec![
        ("zero", 0, [0x00, 0x00, 0x00]),
        ("positive", 0x12_3456, [0x12, 0x34, 0x56]),
        ("minus one", -1, [0xff, 0xff, 0xff]),
        ("min", -0x80_0000, [0x80, 0x00, 0x00]),
        ("max", 0x7f_ffff, [0x7f, 0xff, 0xff]),
    ];

    for (name, value, bytes) in tests {
        let mut view = [0u8; 3];
        write_i24(&mut view, 0, value);
        assert_eq!(view, bytes, "write_i24 {name}");
        assert_eq!(read_i24(&view, 0), value, "read_i24 {name}");
    }
}
