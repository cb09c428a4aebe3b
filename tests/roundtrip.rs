//! End-to-end round trips through the public API: in-memory archives,
//! folder packing/unpacking, and larger chunked payloads.

use std::collections::BTreeMap;
use std::sync::Arc;

use zipcodec::{
    Compression, MemReader, ZipExtractor, ZipWriter, create_zip_file_from_folder,
    extract_zip_file, read_zip_file,
};

fn crc_of(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

async fn write_archive(entries: &[(&str, &[u8])], level: Compression) -> Vec<u8> {
    let mut writer = ZipWriter::with_level(level);
    for (name, data) in entries {
        writer.add_entry_bytes(name, data).await.unwrap();
    }
    writer.finish().unwrap()
}

#[tokio::test]
async fn test_round_trip_concrete_scenario() {
    let input: &[(&str, &[u8])] = &[("a.txt", b"hello"), ("dir/b.txt", b"world")];

    // Any supported compression level must round-trip identically.
    for level in [0u32, 1, 6, 9] {
        let bytes = write_archive(input, Compression::new(level)).await;
        let extractor = ZipExtractor::new(Arc::new(MemReader::new(bytes)));
        let index = extractor.read_archive().await.unwrap();

        assert_eq!(index.len(), 2);
        let out: BTreeMap<&str, &[u8]> = index
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.content.as_deref().unwrap()))
            .collect();
        assert_eq!(out, input.iter().copied().collect::<BTreeMap<_, _>>());

        for (name, data) in input {
            let entry = &index[*name];
            assert_eq!(entry.crc32, crc_of(data));
            assert_eq!(entry.uncompressed_size, data.len() as u64);
        }
    }
}

#[tokio::test]
async fn test_round_trip_binary_payloads() {
    // Pseudo-random payloads larger than the 64 KiB payload chunk, so both
    // sides run their chunked streaming paths.
    let mut state = 0x2545F491_u64;
    let mut noise = |len: usize| -> Vec<u8> {
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (state >> 33) as u8
            })
            .collect()
    };

    let big = noise(300 * 1024);
    let small = noise(37);
    let entries: &[(&str, &[u8])] =
        &[("blob/big.bin", &big), ("blob/small.bin", &small), ("empty.bin", b"")];

    let bytes = write_archive(entries, Compression::default()).await;
    let extractor = ZipExtractor::new(Arc::new(MemReader::new(bytes)));
    let index = extractor.read_archive().await.unwrap();

    assert_eq!(index.len(), 3);
    assert_eq!(index["blob/big.bin"].content.as_deref(), Some(big.as_slice()));
    assert_eq!(index["blob/small.bin"].content.as_deref(), Some(small.as_slice()));
    assert_eq!(index["empty.bin"].content.as_deref(), Some(&b""[..]));
}

#[tokio::test]
async fn test_folder_pack_and_unpack() {
    let src = tempfile::tempdir().unwrap();
    std::fs::write(src.path().join("a.txt"), b"hello").unwrap();
    std::fs::create_dir(src.path().join("dir")).unwrap();
    std::fs::write(src.path().join("dir").join("b.txt"), b"world").unwrap();

    let work = tempfile::tempdir().unwrap();
    let zip_path = work.path().join("packed.zip");
    create_zip_file_from_folder(&zip_path, src.path(), Compression::default())
        .await
        .unwrap();

    let index = read_zip_file(&zip_path).await.unwrap();
    assert_eq!(
        index.keys().collect::<Vec<_>>(),
        vec!["a.txt", "dir/b.txt"]
    );
    assert_eq!(index["a.txt"].content.as_deref(), Some(&b"hello"[..]));

    let dest = tempfile::tempdir().unwrap();
    extract_zip_file(&zip_path, dest.path()).await.unwrap();
    assert_eq!(std::fs::read(dest.path().join("a.txt")).unwrap(), b"hello");
    assert_eq!(
        std::fs::read(dest.path().join("dir").join("b.txt")).unwrap(),
        b"world"
    );

    // Packing again replaces the existing archive rather than failing.
    create_zip_file_from_folder(&zip_path, src.path(), Compression::new(9))
        .await
        .unwrap();
    assert_eq!(read_zip_file(&zip_path).await.unwrap().len(), 2);
}
