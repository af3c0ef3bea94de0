use count_array::{CountArray, CountArrayConfig, CountArrayError};

/// Bits of each k-mer kept as the array-local suffix.
const SUFFIX_BITS: u32 = 20;
/// Bits of each k-mer used to pick the array.
const PREFIX_BITS: u32 = 2;

fn main() {
    println!("=== Count Array Examples ===\n");

    if let Err(e) = example_sharded_counting() {
        eprintln!("counting failed: {e}");
    }

    example_config_errors();
}

/// Packs a DNA string into 2 bits per base, first base in the high bits.
fn encode(kmer: &[u8]) -> u64 {
    kmer.iter().fold(0u64, |acc, &b| {
        let code = match b {
            b'A' => 0,
            b'C' => 1,
            b'G' => 2,
            _ => 3,
        };
        (acc << 2) | code
    })
}

fn example_sharded_counting() -> Result<(), CountArrayError> {
    println!("Example 1: one array per prefix, with a memory budget");

    let sequence = b"ACGTTGCAACGTAGGCTTACGATCGATCGGCTAGCTAGGATCCATGCA";
    let k = ((PREFIX_BITS + SUFFIX_BITS) / 2) as usize;

    let config = CountArrayConfig::new(SUFFIX_BITS, 64 * 1024);
    let mut arrays: Vec<CountArray> = (0..1u64 << PREFIX_BITS).map(|_| CountArray::new()).collect();

    let mut used = 0u64;
    for (prefix, array) in arrays.iter_mut().enumerate() {
        used += array.initialize_with(prefix as u64, &config)?;
    }
    println!("  Baseline footprint: {used} bytes");

    for window in sequence.windows(k) {
        let kmer = encode(window);
        let prefix = (kmer >> SUFFIX_BITS) as usize;
        used += arrays[prefix].add(kmer)?;
    }
    for array in &mut arrays {
        used += array.settle_size_delta();
    }
    println!("  Footprint after {} k-mers: {used} bytes", sequence.len() - k + 1);

    for array in &mut arrays {
        let mut suffixes = array.linearize()?;
        suffixes.sort_unstable();
        println!(
            "  Prefix {}: {} k-mers in {} segment(s), smallest suffix {:?}",
            array.prefix(),
            suffixes.len(),
            array.segment_count(),
            suffixes.first()
        );
        array.release();
    }
    println!();

    Ok(())
}

fn example_config_errors() {
    println!("Example 2: configuration errors fail fast");

    for (width, segment_bits) in [(0, 64), (65, 64), (16, 100)] {
        let mut array = CountArray::new();
        match array.initialize(0, width, segment_bits) {
            Ok(_) => println!("  width {width}, segment {segment_bits}: ok"),
            Err(e) => println!("  width {width}, segment {segment_bits}: {e}"),
        }
    }
}
