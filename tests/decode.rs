use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use interop::{
    decode, decode_with, read_control_metrics, read_corrected_intensity_metrics,
    read_error_metrics, read_extraction_metrics, read_image_metrics, read_quality_metrics,
    read_tile_metrics, Column, DecodeOptions, InteropError, MetricKind, MetricTable, RunDirectory,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(bytes).unwrap();
    path
}

fn push_u16s(buf: &mut Vec<u8>, xs: &[u16]) {
    for x in xs {
        buf.extend_from_slice(&x.to_le_bytes());
    }
}

fn push_f32s(buf: &mut Vec<u8>, xs: &[f32]) {
    for x in xs {
        buf.extend_from_slice(&x.to_le_bytes());
    }
}

fn push_u32s(buf: &mut Vec<u8>, xs: &[u32]) {
    for x in xs {
        buf.extend_from_slice(&x.to_le_bytes());
    }
}

fn extraction_record(cycle: u16, datetime: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    push_u16s(&mut buf, &[1, 1101, cycle]);
    push_f32s(&mut buf, &[2.1, 2.2, 2.3, 2.4]);
    push_u16s(&mut buf, &[1000, 1100, 1200, 1300]);
    buf.extend_from_slice(&datetime.to_le_bytes());
    buf
}

fn tile_record(lane: u16, tile: u16, code: u16, value: f32) -> Vec<u8> {
    let mut buf = Vec::new();
    push_u16s(&mut buf, &[lane, tile, code]);
    push_f32s(&mut buf, &[value]);
    buf
}

fn control_record(lane: u16, control: &[u8], index: &[u8], nclust: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    push_u16s(&mut buf, &[lane, 1101, 1, control.len() as u16]);
    buf.extend_from_slice(control);
    push_u16s(&mut buf, &[index.len() as u16]);
    buf.extend_from_slice(index);
    push_u32s(&mut buf, &[nclust]);
    buf
}

/// One random record of a fixed layout, built field by field from its descriptor
fn random_fixed_record(rng: &mut SmallRng, kind: MetricKind) -> Vec<u8> {
    let desc = kind.descriptor();
    let mut buf = Vec::with_capacity(desc.record_size.unwrap());
    for field in desc.fields {
        match field.ty {
            interop::FieldType::U16 => push_u16s(&mut buf, &[rng.random()]),
            interop::FieldType::U32 => push_u32s(&mut buf, &[rng.random()]),
            interop::FieldType::U64 => buf.extend_from_slice(&rng.random::<u64>().to_le_bytes()),
            interop::FieldType::F32 => push_f32s(&mut buf, &[rng.random_range(0.0..1000.0)]),
            interop::FieldType::U32Array(n) => {
                for _ in 0..n {
                    push_u32s(&mut buf, &[rng.random()]);
                }
            }
            interop::FieldType::Text => unreachable!(),
        }
    }
    buf
}

#[test]
fn test_extraction_metrics() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![3, 38];
    bytes.extend(extraction_record(1, 0xC000_0000_0000_0001));
    bytes.extend(extraction_record(2, 0x08D5_0000_0000_0000));
    let path = write_file(dir.path(), "ExtractionMetricsOut.bin", &bytes);

    let table = read_extraction_metrics(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.column("cycle"), Some(&Column::Int(vec![1, 2])));
    assert_eq!(
        table.column("datetime"),
        Some(&Column::Timestamp(vec![1, 0x08D5_0000_0000_0000]))
    );
    assert_eq!(table.column("fwhmT"), Some(&Column::Float(vec![2.4, 2.4])));
    assert_eq!(table.column("intA"), Some(&Column::Int(vec![1000, 1000])));
}

#[test]
fn test_quality_metrics() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![4, 206];
    for cycle in 1..=4u16 {
        push_u16s(&mut bytes, &[1, 1101, cycle]);
        let counts: Vec<u32> = (0..50).map(|q| u32::from(cycle) * q).collect();
        push_u32s(&mut bytes, &counts);
    }
    let path = write_file(dir.path(), "QMetricsOut.bin", &bytes);

    let table = read_quality_metrics(&path).unwrap();
    assert_eq!(table.key.len(), 4);
    assert_eq!(table.nclust.nrows(), 4);
    assert_eq!(table.nclust.ncols(), 50);
    assert_eq!(table.nclust.get(3, 10), Some(40));

    // row sums do not depend on bucket order
    let sums = table.nclust.row_sums();
    for (row, sum) in sums.iter().enumerate() {
        let mut reversed: Vec<u32> = table.nclust.row(row).unwrap().to_vec();
        reversed.reverse();
        assert_eq!(*sum, reversed.iter().map(|&x| x as u64).sum::<u64>());
    }
    assert_eq!(sums[0], (0..50u64).sum::<u64>());
}

#[test]
fn test_error_metrics() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![3, 30];
    push_u16s(&mut bytes, &[2, 2105, 11]);
    push_f32s(&mut bytes, &[0.125]);
    push_u32s(&mut bytes, &[5000, 40, 3, 2, 1]);
    let path = write_file(dir.path(), "ErrorMetricsOut.bin", &bytes);

    let table = read_error_metrics(&path).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.column("erate"), Some(&Column::Float(vec![0.125])));
    assert_eq!(table.column("n"), Some(&Column::UInt(vec![5000])));
    assert_eq!(table.column("n3e"), Some(&Column::UInt(vec![2])));
}

#[test]
fn test_tile_metrics_codes_pass_through() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![2, 10];
    bytes.extend(tile_record(1, 1101, 100, 180.5));
    bytes.extend(tile_record(1, 1101, 203, 0.1));
    bytes.extend(tile_record(1, 1101, 9999, 7.0));
    let path = write_file(dir.path(), "TileMetricsOut.bin", &bytes);

    let table = read_tile_metrics(&path).unwrap();
    assert_eq!(table.column("code"), Some(&Column::Int(vec![100, 203, 9999])));
    assert_eq!(table.column("value"), Some(&Column::Float(vec![180.5, 0.1, 7.0])));
}

#[test]
fn test_corrected_intensity_metrics() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![2, 48];
    push_u16s(&mut bytes, &[1, 1101, 5, 900, 1, 2, 3, 4, 5, 6, 7, u16::MAX]);
    push_f32s(&mut bytes, &[10.0, 11.0, 12.0, 13.0, 14.0, 3.5]);
    let path = write_file(dir.path(), "CorrectedIntMetricsOut.bin", &bytes);

    let table = read_corrected_intensity_metrics(&path).unwrap();
    assert_eq!(table.num_columns(), 18);
    assert_eq!(table.column("avgint"), Some(&Column::Int(vec![900])));
    assert_eq!(table.column("avgintclT"), Some(&Column::Int(vec![65535])));
    assert_eq!(table.column("bcNC"), Some(&Column::Float(vec![10.0])));
    assert_eq!(table.column("srratio"), Some(&Column::Float(vec![3.5])));
}

#[test]
fn test_image_metrics() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![1, 12];
    for channel in 0..4u16 {
        push_u16s(&mut bytes, &[1, 1101, 1, channel, 100 + channel, 2000 + channel]);
    }
    let path = write_file(dir.path(), "ImageMetricsOut.bin", &bytes);

    let table = read_image_metrics(&path).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.column("channelid"), Some(&Column::Int(vec![0, 1, 2, 3])));
    assert_eq!(
        table.column("maxcont"),
        Some(&Column::Int(vec![2000, 2001, 2002, 2003]))
    );
}

#[test]
fn test_control_metrics() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![1];
    bytes.extend(control_record(1, b"phiX1", b"", 42));
    bytes.extend(control_record(2, b"CTL", b"ACGTAC", 7));
    // incomplete trailing record
    bytes.extend(&control_record(3, b"CTL", b"ACGTAC", 9)[..12]);
    let path = write_file(dir.path(), "ControlMetricsOut.bin", &bytes);

    let table = read_control_metrics(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.column("control"),
        Some(&Column::Text(vec!["phiX1".to_string(), "CTL".to_string()]))
    );
    assert_eq!(
        table.column("index"),
        Some(&Column::Text(vec![String::new(), "ACGTAC".to_string()]))
    );
    assert_eq!(table.column("nclust"), Some(&Column::UInt(vec![42, 7])));
    assert_eq!(table.column("lane"), Some(&Column::Int(vec![1, 2])));
}

#[test]
fn test_control_oversized_field() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![1];
    bytes.extend(control_record(1, &[b'A'; 257], b"", 1));
    let path = write_file(dir.path(), "ControlMetricsOut.bin", &bytes);

    assert!(matches!(
        read_control_metrics(&path),
        Err(InteropError::OversizedField { len: 257, .. })
    ));

    // a larger ceiling accepts the same file
    let options = DecodeOptions::default().max_field_len(1024);
    let table = decode_with(&path, MetricKind::Control, &options).unwrap();
    assert_eq!(table.len(), 1);
}

#[test]
fn test_k_records_and_truncated_tails() {
    let dir = TempDir::new().unwrap();
    let mut rng = SmallRng::seed_from_u64(42);
    for kind in MetricKind::ALL {
        let Some(record_size) = kind.descriptor().record_size else {
            continue;
        };
        for k in [0usize, 1, 7] {
            let mut bytes = vec![1, record_size as u8];
            for _ in 0..k {
                bytes.extend(random_fixed_record(&mut rng, kind));
            }
            for tail in [0, 1, record_size - 1] {
                let mut file = bytes.clone();
                file.extend(std::iter::repeat(0xABu8).take(tail));
                let path = write_file(dir.path(), kind.file_name(), &file);

                let table = decode(&path, kind).unwrap();
                let expected = (file.len() - 2) / record_size;
                assert_eq!(expected, k);
                assert_eq!(table.len(), k, "{kind} k={k} tail={tail}");
                assert!(table.columns().iter().all(|(_, c)| c.len() == k));
            }
        }
    }
}

#[test]
fn test_decoding_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let mut rng = SmallRng::seed_from_u64(7);
    for kind in MetricKind::ALL {
        let mut bytes = match kind.descriptor().record_size {
            Some(size) => vec![2, size as u8],
            None => vec![1],
        };
        for i in 0..25u16 {
            match kind {
                MetricKind::Control => {
                    let name: Vec<u8> = (0..rng.random_range(0..20))
                        .map(|_| rng.random_range(b'A'..=b'Z'))
                        .collect();
                    bytes.extend(control_record(i, &name, b"ACGT", rng.random()));
                }
                _ => bytes.extend(random_fixed_record(&mut rng, kind)),
            }
        }
        let path = write_file(dir.path(), kind.file_name(), &bytes);

        let first = decode(&path, kind).unwrap();
        let second = decode(&path, kind).unwrap();
        assert_eq!(first.len(), 25, "{kind}");
        assert_eq!(first, second, "{kind}");

        let mapped = decode_with(&path, kind, &DecodeOptions::default().mmap(true)).unwrap();
        assert_eq!(first, mapped, "{kind}");
    }
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = read_tile_metrics(dir.path().join("TileMetricsOut.bin"));
    match result {
        Err(InteropError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected not-found I/O error, got {other:?}"),
    }
}

#[test]
fn test_strict_record_length() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![1, 14];
    push_u16s(&mut bytes, &[1, 1101, 1, 0, 10, 20]);
    let path = write_file(dir.path(), "ImageMetricsOut.bin", &bytes);

    // the declared length byte is informational by default
    assert_eq!(read_image_metrics(&path).unwrap().len(), 1);

    let strict = DecodeOptions::default().strict_record_len(true);
    assert!(matches!(
        decode_with(&path, MetricKind::Image, &strict),
        Err(InteropError::RecordLengthMismatch {
            expected: 12,
            actual: 14,
            ..
        })
    ));
}

#[test]
fn test_run_directory() {
    let dir = TempDir::new().unwrap();
    let mut tile = vec![2, 10];
    tile.extend(tile_record(1, 1101, 100, 1.0));
    write_file(dir.path(), "TileMetricsOut.bin", &tile);

    let mut control = vec![1];
    control.extend(control_record(1, b"CTL", b"", 3));
    control.extend(control_record(1, b"CTL", b"", 4));
    write_file(dir.path(), "ControlMetricsOut.bin", &control);

    // unreadable as Error metrics: header only
    write_file(dir.path(), "ErrorMetricsOut.bin", &[3]);
    write_file(dir.path(), "RunInfo.xml", b"<RunInfo/>");
    std::fs::create_dir(dir.path().join("Images")).unwrap();

    let run = RunDirectory::scan(dir.path()).unwrap();
    assert_eq!(run.root(), dir.path());
    let kinds: Vec<_> = run.files().iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![MetricKind::Control, MetricKind::Error, MetricKind::Tile]
    );

    for threads in [0, 1, 2, 8] {
        let results = run.decode_all(threads, &DecodeOptions::default());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().len(), 2);
        assert!(matches!(results[1], Err(InteropError::Io(_))));
        let tiles = results[2].as_ref().unwrap();
        assert!(matches!(tiles, MetricTable::Columns(_)));
        assert_eq!(tiles.len(), 1);
    }
}

#[test]
fn test_empty_run_directory() {
    let dir = TempDir::new().unwrap();
    let run = RunDirectory::scan(dir.path()).unwrap();
    assert!(run.files().is_empty());
    assert!(run.decode_all(4, &DecodeOptions::default()).is_empty());
}

#[cfg(feature = "niffler")]
#[test]
fn test_gzip_compressed_file() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![2, 10];
    for (i, code) in [100u16, 101, 102, 103, 200, 201].into_iter().enumerate() {
        bytes.extend(tile_record(1, 1101 + i as u16, code, i as f32 * 10.5));
    }
    let plain = write_file(dir.path(), "TileMetricsOut.bin", &bytes);

    let compressed = dir.path().join("TileMetricsOut.bin.gz");
    {
        let file = Box::new(File::create(&compressed).unwrap());
        let mut writer =
            niffler::send::get_writer(file, niffler::send::compression::Format::Gzip, niffler::Level::Six).unwrap();
        writer.write_all(&bytes).unwrap();
    }
    assert_ne!(std::fs::read(&compressed).unwrap(), bytes);

    let expected = decode(&plain, MetricKind::Tile).unwrap();
    assert_eq!(expected.len(), 6);
    assert_eq!(decode(&compressed, MetricKind::Tile).unwrap(), expected);
    let options = DecodeOptions::default().mmap(true);
    assert_eq!(
        decode_with(&compressed, MetricKind::Tile, &options).unwrap(),
        expected
    );

    let run = RunDirectory::scan(dir.path()).unwrap();
    let paths: Vec<_> = run.files().iter().map(|f| f.path.clone()).collect();
    assert_eq!(paths, vec![plain, compressed]);
    assert!(run.files().iter().all(|f| f.kind == MetricKind::Tile));
    for result in run.decode_all(2, &DecodeOptions::default()) {
        assert_eq!(result.unwrap(), expected);
    }
}
