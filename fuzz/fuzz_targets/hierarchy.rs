#![no_main]

use cxxcatch::{
    typeinfo::{decode_offset_flags, BaseEntry, BaseFlags, TypeRegistryBuilder},
    CatchMatcher, MatchConfig, ObjectPtr,
};
use libfuzzer_sys::fuzz_target;

// Every 4 bytes describe one class: base count, base selector, flags, offset
fuzz_target!(|data: &[u8]| {
    let builder = TypeRegistryBuilder::with_config(MatchConfig::minimal());
    let mut classes = Vec::new();

    for (index, chunk) in data.chunks_exact(4).enumerate().take(12) {
        let name = format!("C{index}");
        let mut bases = Vec::new();
        if !classes.is_empty() {
            for i in 0..usize::from(chunk[0] % 4) {
                let base = &classes[(usize::from(chunk[1]) + i) % classes.len()];
                let flags = BaseFlags::from_bits_truncate(chunk[2] >> i);
                let offset = isize::from(chunk[3] as i8) * 8;
                if let Ok(entry) = BaseEntry::new(base, offset, flags) {
                    bases.push(entry);
                }
            }
        }
        if let Ok(class) = builder.class_with_bases(&name, bases) {
            classes.push(class);
        }

        let raw = isize::from_le_bytes(
            std::array::from_fn(|byte| chunk[byte % 4].wrapping_add(byte as u8)),
        );
        let _ = decode_offset_flags(raw);
    }

    let matcher = CatchMatcher::new(MatchConfig::minimal());
    for handler in &classes {
        for thrown in &classes {
            let _ = matcher.try_catch(handler, thrown, ObjectPtr::NULL);
            let _ = matcher.try_catch(handler, thrown, ObjectPtr::new(0x1000));
        }
    }
});
