// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Cursor;

use anvil_nbt::nbt::{self, NbtArray, NbtList, NbtOptions, NbtTag, TagType};
use anvil_nbt::region::Region;
use indexmap::IndexMap;

fn build_level_compound() -> NbtTag {
    let mut root = IndexMap::new();
    root.insert("byte".to_string(), NbtTag::Byte(127));
    root.insert("short".to_string(), NbtTag::Short(32767));
    root.insert("int".to_string(), NbtTag::Int(2_147_483_647));
    root.insert("long".to_string(), NbtTag::Long(9_223_372_036_854_775_807));
    root.insert("float".to_string(), NbtTag::Float(1.5));
    root.insert("double".to_string(), NbtTag::Double(2.5));

    let list = NbtList::new(vec![
        NbtTag::String("A".to_string()),
        NbtTag::String("B".to_string()),
        NbtTag::String("C".to_string()),
    ])
    .unwrap();
    root.insert("list".to_string(), NbtTag::List(list));

    root.insert(
        "intArray".to_string(),
        NbtTag::IntArray(NbtArray::from_values(&[1, 2, 3])),
    );

    let mut nested = IndexMap::new();
    nested.insert("key".to_string(), NbtTag::String("value".to_string()));
    root.insert("nested".to_string(), NbtTag::Compound(nested));

    NbtTag::Compound(root)
}

#[test]
fn complex_document_round_trips_uncompressed() {
    let root = build_level_compound();
    let bytes = nbt::encode("Level", &root, NbtOptions::new()).unwrap();
    let (name, decoded) = nbt::decode(&bytes, NbtOptions::new()).unwrap();
    assert_eq!(name, "Level");
    assert_eq!(decoded, root);
}

#[test]
fn complex_document_round_trips_gzip() {
    let root = build_level_compound();
    let options = NbtOptions::new().compressed(true);
    let bytes = nbt::encode("Level", &root, options).unwrap();
    let (name, decoded) = nbt::decode(&bytes, options).unwrap();
    assert_eq!(name, "Level");
    assert_eq!(decoded, root);
}

#[test]
fn complex_document_round_trips_zlib() {
    let root = build_level_compound();
    let options = NbtOptions::new().compressed(true).use_zlib(true);
    let bytes = nbt::encode("Level", &root, options).unwrap();
    let (name, decoded) = nbt::decode(&bytes, options).unwrap();
    assert_eq!(name, "Level");
    assert_eq!(decoded, root);
}

#[test]
fn little_endian_document_round_trips() {
    let root = build_level_compound();
    let options = NbtOptions::new().little_endian(true);
    let bytes = nbt::encode("Level", &root, options).unwrap();
    let (name, decoded) = nbt::decode(&bytes, options).unwrap();
    assert_eq!(name, "Level");
    assert_eq!(decoded, root);
}

#[test]
fn decode_reader_matches_decode_on_a_stream() {
    let root = build_level_compound();
    let options = NbtOptions::new().compressed(true);
    let bytes = nbt::encode("Level", &root, options).unwrap();
    let mut cursor = Cursor::new(bytes);
    let (name, decoded) = nbt::decode_reader(&mut cursor, options).unwrap();
    assert_eq!(name, "Level");
    assert_eq!(decoded, root);
}

#[test]
fn is_valid_and_type_of_agree_with_the_tree() {
    let root = build_level_compound();
    assert!(nbt::is_valid(&root));
    assert_eq!(nbt::type_of(&root), TagType::Compound);

    let mut bad_list = NbtList::empty(TagType::Int);
    bad_list.push_unchecked(NbtTag::Int(1));
    bad_list.push_unchecked(NbtTag::String("oops".to_string()));
    let mut bad_root = IndexMap::new();
    bad_root.insert("l".to_string(), NbtTag::List(bad_list));
    assert!(!nbt::is_valid(&NbtTag::Compound(bad_root)));
}

#[test]
fn new_region_is_exactly_two_empty_header_sectors() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("anvil-nbt-test-{}.mca", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let region = Region::open(&path).unwrap();
        assert!(region.is_empty());
    }

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8192);
    assert!(bytes.iter().all(|&b| b == 0));

    std::fs::remove_file(&path).unwrap();
}

fn chunk_with_marker(value: i32) -> NbtTag {
    let mut map = IndexMap::new();
    map.insert("marker".to_string(), NbtTag::Int(value));
    NbtTag::Compound(map)
}

#[test]
fn region_set_and_get_round_trip_through_a_file() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("anvil-nbt-test-rw-{}.mca", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let mut region = Region::open(&path).unwrap();
        let chunk = chunk_with_marker(99);
        assert!(region.set_chunk(5, 9, Some(("Level", &chunk))).unwrap());
        let (name, got) = region.get_chunk(5, 9).unwrap().unwrap();
        assert_eq!(name, "Level");
        assert_eq!(got, chunk);
        assert!(!region.is_empty());
    }

    {
        let mut reopened = Region::open(&path).unwrap();
        let (name, got) = reopened.get_chunk(5, 9).unwrap().unwrap();
        assert_eq!(name, "Level");
        assert_eq!(got, chunk_with_marker(99));
    }

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn region_rewrite_defragments_and_preserves_surviving_chunks() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("anvil-nbt-test-rewrite-{}.mca", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let size_before_rewrite = {
        let mut region = Region::open(&path).unwrap();
        for i in 0..8u8 {
            let chunk = chunk_with_marker(i as i32);
            region
                .set_chunk(i as i32, 0, Some(("c", &chunk)))
                .unwrap();
        }
        // Delete a scattered subset so the surviving chunks are fragmented.
        for &i in &[0u8, 2, 5, 7] {
            region.set_chunk(i as i32, 0, None).unwrap();
        }

        let size_before = std::fs::metadata(&path).unwrap().len();
        region.rewrite().unwrap();
        size_before
    };

    let size_after_rewrite = std::fs::metadata(&path).unwrap().len();
    assert!(size_after_rewrite <= size_before_rewrite);
    assert!(size_after_rewrite < size_before_rewrite);

    let mut reopened = Region::open(&path).unwrap();
    for &i in &[1u8, 3, 4, 6] {
        let (_, tag) = reopened.get_chunk(i as i32, 0).unwrap().unwrap();
        assert_eq!(tag, chunk_with_marker(i as i32));
    }
    for &i in &[0u8, 2, 5, 7] {
        assert!(reopened.get_chunk(i as i32, 0).unwrap().is_none());
    }

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn region_rejects_out_of_range_chunk_coordinates() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("anvil-nbt-test-bounds-{}.mca", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let mut region = Region::open(&path).unwrap();
    let chunk = chunk_with_marker(1);
    let err = region.set_chunk(32, 0, Some(("c", &chunk))).unwrap_err();
    assert!(matches!(err, anvil_nbt::region::RegionError::InvalidArg(_)));

    std::fs::remove_file(&path).unwrap();
}
