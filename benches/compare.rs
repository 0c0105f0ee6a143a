// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

use std::hint::black_box;

use anvil_nbt::nbt::{self, NbtArray, NbtList, NbtOptions, NbtTag};
use anvil_nbt::region::Region;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use indexmap::IndexMap;
use std::io::Cursor;

/// A synthetic "chunk"-shaped document: a handful of scalars, a long list,
/// and a sizeable `IntArray`, roughly matching the section/heightmap shape
/// of a real Anvil chunk without depending on any fixture file.
fn synthetic_document(width: usize) -> NbtTag {
    let mut root = IndexMap::new();
    root.insert("DataVersion".to_string(), NbtTag::Int(3700));
    root.insert("xPos".to_string(), NbtTag::Int(12));
    root.insert("zPos".to_string(), NbtTag::Int(-4));

    let longs: Vec<NbtTag> = (0..width as i64).map(NbtTag::Long).collect();
    root.insert(
        "BlockStates".to_string(),
        NbtTag::List(NbtList::new(longs).unwrap()),
    );

    let heightmap: Vec<i32> = (0..width as i32).collect();
    root.insert(
        "Heightmap".to_string(),
        NbtTag::IntArray(NbtArray::from_values(&heightmap)),
    );

    NbtTag::Compound(root)
}

fn bench_nbt_codec(c: &mut Criterion) {
    for &width in &[64usize, 4096] {
        let doc = synthetic_document(width);
        let encoded = nbt::encode("chunk", &doc, NbtOptions::new()).unwrap();

        let mut group = c.benchmark_group(format!("nbt/{width}-longs"));
        group.throughput(Throughput::Bytes(encoded.len() as u64));

        group.bench_function("encode", |b| {
            b.iter(|| black_box(nbt::encode("chunk", &doc, NbtOptions::new()).unwrap()))
        });

        group.bench_function("decode", |b| {
            b.iter(|| black_box(nbt::decode(&encoded, NbtOptions::new()).unwrap()))
        });

        group.finish();
    }
}

fn bench_region_chunk_roundtrip(c: &mut Criterion) {
    let doc = synthetic_document(1024);

    let mut group = c.benchmark_group("region/single-chunk");
    group.bench_function("set_chunk", |b| {
        b.iter(|| {
            let cursor = Cursor::new(vec![0u8; 4096 * 2]);
            let mut region = Region::from_io(cursor).unwrap();
            black_box(region.set_chunk(0, 0, Some(("Level", &doc))).unwrap());
        })
    });

    let cursor = Cursor::new(vec![0u8; 4096 * 2]);
    let mut region = Region::from_io(cursor).unwrap();
    region.set_chunk(0, 0, Some(("Level", &doc))).unwrap();

    group.bench_function("get_chunk", |b| {
        b.iter(|| black_box(region.get_chunk(0, 0).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_nbt_codec, bench_region_chunk_roundtrip);
criterion_main!(benches);
