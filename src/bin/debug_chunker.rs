use botok::{ChunkTag, Chunker};

fn main() {
    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ཀ འདི་ ཤི དེ་ག རེད་དོ།".to_string());
    println!("Input: {}", input);

    let chunker = Chunker::new(&input);
    let chunks = chunker.make_chunks();

    println!("\nChunks:");
    for (i, (chunk, (tag, text))) in chunks
        .iter()
        .zip(chunker.get_readable(&chunks))
        .enumerate()
    {
        println!(
            "  {}: {:<6} {:?} - syl: {:?}, coda: {:?}",
            i, tag, text, chunk.syl, chunk.coda
        );
    }

    let text_chunks = chunks
        .iter()
        .filter(|c| c.chunk_type == ChunkTag::Text)
        .count();
    println!("\nText chunks count: {}", text_chunks);
}
