use compresso::compression::{dct, huffman, lzw};
use compresso::{Compression, Error, StreamingCompression};
use compresso::compression::{
    compress_frame, BlockTransform, Frame, FrameCodecConfig, FramePipeline, HuffmanCodec,
    LzwCodec, LzwDecoder, LzwEncoder,
};
use ndarray::{s, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_bytes(rng: &mut StdRng, len: usize, alphabet: u8) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(0..alphabet)).collect()
}

#[test]
fn test_huffman_round_trip_random() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..50 {
        let len = rng.gen_range(1..2000);
        let alphabet = rng.gen_range(1..=255u8);
        let input = random_bytes(&mut rng, len, alphabet);

        let encoded = huffman::encode(&input).unwrap();
        assert_eq!(huffman::decode(&encoded.bits, &encoded.tree).unwrap(), input);
        assert_eq!(huffman::decompress::<u8>(&encoded.to_artifact()).unwrap(), input);
    }
}

#[test]
fn test_huffman_codebooks_are_prefix_free() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..30 {
        let len = rng.gen_range(1..500);
        let input = random_bytes(&mut rng, len, 200);
        let table = huffman::build_frequency_table(&input);
        let book = huffman::generate_codes(&huffman::build_huffman_tree(&table).unwrap());
        assert_eq!(book.len(), table.len());
        assert!(book.is_prefix_free());
    }
}

#[test]
fn test_huffman_single_symbol_artifact() {
    for len in [1, 2, 7, 8, 9, 1000] {
        let input = vec![b'z'; len];
        let artifact = huffman::compress(&input).unwrap();
        assert_eq!(huffman::decompress::<u8>(&artifact).unwrap(), input);
    }
}

#[test]
fn test_huffman_scenario() {
    let text = "aaaabbbccd";
    let symbols: Vec<char> = text.chars().collect();
    let encoded = huffman::encode(&symbols).unwrap();
    assert_eq!(encoded.tree.leaf_count(), 4);

    let book = huffman::generate_codes(&encoded.tree);
    let len = |c: char| book.get(&c).unwrap().len();
    assert!(len('a') <= len('b'));
    assert!(len('b') <= len('c'));
    assert_eq!(len('c'), len('d'));

    let decoded: String = encoded.decode().unwrap().into_iter().collect();
    assert_eq!(decoded, text);
}

#[test]
fn test_lzw_round_trip_random() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let len = rng.gen_range(0..5000);
        let alphabet = rng.gen_range(1..=255u8);
        let input = random_bytes(&mut rng, len, alphabet);
        let codes = lzw::encode(&input).unwrap();
        assert_eq!(lzw::decode(&codes).unwrap(), input);
        assert_eq!(lzw::decompress(&lzw::compress(&input).unwrap()).unwrap(), input);
    }
}

#[test]
fn test_lzw_dictionary_growth_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(3);
    let input = random_bytes(&mut rng, 4000, 6);

    let mut encoder = LzwEncoder::new();
    encoder.extend(&input).unwrap();
    encoder.flush().unwrap();
    let codes = encoder.take_codes();

    let mut decoder = LzwDecoder::new();
    let mut out = Vec::new();
    for &code in &codes {
        decoder.push_code(code, &mut out).unwrap();
    }
    assert_eq!(out, input);
    assert_eq!(encoder.dictionary().entries(), decoder.dictionary_entries());
}

#[test]
fn test_lzw_scenario_learns_longer_sequences() {
    let input = "TOBEORNOTTOBEORTOBEORNOT";
    let codes = lzw::encode(input.as_bytes()).unwrap();
    assert!(codes.len() < input.len());

    // Learned codes only show up once the stream starts repeating itself.
    let (first, second) = codes.split_at(codes.len() / 2);
    let learned = |part: &[u16]| part.iter().filter(|&&c| u32::from(c) >= lzw::SEED_CODES).count();
    assert!(learned(second) > learned(first));

    let artifact = lzw::compress_text(input).unwrap();
    assert_eq!(artifact.len(), 2 * codes.len());
    assert_eq!(lzw::decompress_text(&artifact).unwrap(), input);
}

#[test]
fn test_lzw_rejects_unknown_code() {
    assert!(matches!(
        lzw::decode(&[72, 105, 400]),
        Err(Error::InvalidCode { code: 400, .. })
    ));
}

#[test]
fn test_codecs_behind_trait_objects() {
    let data = b"she sells sea shells by the sea shore".repeat(20);
    let codecs: [&dyn Compression; 2] = [&HuffmanCodec, &LzwCodec];
    for codec in codecs {
        let packed = codec.compress(&data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(codec.decompress(&packed).unwrap(), data);
    }
}

#[test]
fn test_lzw_streaming_chunks() {
    let mut rng = StdRng::seed_from_u64(99);
    let input = random_bytes(&mut rng, 3000, 4);
    let mut encoder = LzwEncoder::new();
    let mut artifact = Vec::new();
    for chunk in input.chunks(97) {
        artifact.extend(encoder.process(chunk).unwrap());
    }
    artifact.extend(encoder.finish().unwrap());
    assert_eq!(lzw::decompress(&artifact).unwrap(), input);
}

#[test]
fn test_threshold_monotonicity_random_blocks() {
    let mut rng = StdRng::seed_from_u64(8);
    let transform = BlockTransform::new(8).unwrap();
    for _ in 0..20 {
        let block = Array2::from_shape_fn((8, 8), |_| rng.gen_range(0.0..255.0));
        let coefficients = transform.forward(&block.view()).unwrap();
        let mut last = 0;
        let mut limit = 0.0;
        while limit < 2500.0 {
            let mut c = coefficients.clone();
            c.threshold(limit);
            assert!(c.zero_count() >= last);
            last = c.zero_count();
            limit += 25.0;
        }
    }
}

#[test]
fn test_zero_block_scenario() {
    let transform = dct::BlockTransform::new(4).unwrap();
    let block = Array2::<u8>::zeros((4, 4));
    for limit in [0.0, 1.0, 100.0] {
        assert_eq!(transform.compress_block(&block.view(), limit).unwrap(), block);
    }
}

#[test]
fn test_edge_block_passthrough_random() {
    let mut rng = StdRng::seed_from_u64(21);
    for (width, height) in [(17, 9), (8, 15), (3, 3), (31, 33)] {
        let data = random_bytes(&mut rng, width * height * 3, 255);
        let frame = Frame::new(width, height, 3, data).unwrap();
        let config = FrameCodecConfig {
            block_size: 8,
            threshold: 80.0,
        };
        let out = compress_frame(&frame, &config).unwrap();
        let (full_rows, full_cols) = (height / 8 * 8, width / 8 * 8);
        let before = frame.as_array();
        let after = out.frame.as_array();
        assert_eq!(
            before.slice(s![full_rows.., .., ..]),
            after.slice(s![full_rows.., .., ..])
        );
        assert_eq!(
            before.slice(s![.., full_cols.., ..]),
            after.slice(s![.., full_cols.., ..])
        );
    }
}

#[test]
fn test_pipeline_preserves_order() {
    let mut rng = StdRng::seed_from_u64(5);
    let frames: Vec<Frame> = (0..6)
        .map(|_| Frame::new(16, 8, 3, random_bytes(&mut rng, 16 * 8 * 3, 255)).unwrap())
        .collect();
    let pipeline = FramePipeline::new(FrameCodecConfig::default()).unwrap();
    let output = pipeline.compress_frames(frames.clone()).unwrap();
    for (frame, compressed) in frames.iter().zip(&output.frames) {
        assert_eq!(
            compressed,
            &compress_frame(frame, pipeline.config()).unwrap()
        );
    }
}
