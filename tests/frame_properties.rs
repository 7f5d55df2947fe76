use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sccrypt::pipeline::{open_frame, seal_frame};
use sccrypt::{crypto, Error, Frame, Header, Record};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn any_single_bit_flip_in_data_is_caught(
        chunk in proptest::collection::vec(any::<u8>(), 1..=4096),
        seed in any::<u64>(),
        bit in any::<prop::sample::Index>(),
    ) {
        let key = crypto::derive_key("p@ssw0rd");
        let fixed_iv = crypto::fixed_iv();
        let mut frame = seal_frame(&chunk, &key, &fixed_iv, &mut StdRng::seed_from_u64(seed)).unwrap();

        let bit = bit.index(frame.data.len() * 8);
        frame.data[bit / 8] ^= 1 << (bit % 8);

        let result = open_frame(&frame, 1, &key, &fixed_iv);
        prop_assert!(matches!(result, Err(Error::ChecksumMismatch { .. })), "expected ChecksumMismatch, got {:?}", result);
    }

    #[test]
    fn sealed_chunks_reopen(
        chunk in proptest::collection::vec(any::<u8>(), 1..=4096),
        password in ".{0,48}",
        seed in any::<u64>(),
    ) {
        let key = crypto::derive_key(&password);
        let fixed_iv = crypto::fixed_iv();
        let frame = seal_frame(&chunk, &key, &fixed_iv, &mut StdRng::seed_from_u64(seed)).unwrap();
        let decoded = Frame::decode(&frame.encode()).unwrap();
        prop_assert_eq!(open_frame(&decoded, 1, &key, &fixed_iv).unwrap(), chunk);
    }

    #[test]
    fn decoders_reject_garbage_without_panicking(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        for result in [Header::decode(&bytes).map(drop), Frame::decode(&bytes).map(drop)] {
            prop_assert!(matches!(result, Ok(()) | Err(Error::InvalidData(_))));
        }
    }
}
