#![no_main]

use bitstream::BitReader;
use broadcast::ReceiverUpdate;
use fields::ObjectGuid;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    if let Ok(update) = ReceiverUpdate::read(ObjectGuid::EMPTY, &mut reader) {
        // Padding and guid packing need not be canonical on input, so
        // compare the re-read frame rather than the bytes.
        let bytes = update.to_bytes();
        let mut reader = BitReader::new(&bytes);
        let again = ReceiverUpdate::read(ObjectGuid::EMPTY, &mut reader);
        assert_eq!(again.as_ref(), Ok(&update));
    }
});
