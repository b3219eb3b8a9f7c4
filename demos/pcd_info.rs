use std::env;
use std::time::Instant;

fn main() {
    let path = env::args().nth(1).expect("Usage: pcd_info <file.pcd>");

    let header = pcdz::read_pcd_file_header(&path).unwrap();
    println!("version: {}", header.version());
    println!("encoding: {:?}, {:?} line endings", header.encoding(), header.line_ending());
    println!("points: {} ({} x {})", header.point_count(), header.width(), header.height());
    println!("viewpoint: {:?} {:?}", header.viewpoint_translation(), header.viewpoint_quaternion());
    for field in header.fields() {
        println!(
            "  {:<12} size {} count {} {:?}",
            field.name(),
            field.size(),
            field.count(),
            field.kind()
        );
    }
    println!("payload at byte {}, row stride {}", header.payload_offset(), header.row_stride());

    let now = Instant::now();
    match pcdz::read_pcd_file(&path) {
        Ok(document) => {
            let duration = now.elapsed();
            println!(
                "Decoded {} points in {}s {} ms",
                document.len(),
                duration.as_secs(),
                duration.subsec_millis()
            );
            if let Some(first) = document.points().first() {
                println!("first point: {:?} color {:?}", first.xyz(), first.rgb());
            }
        }
        Err(e) => println!("Could not decode the payload: {}", e),
    }
}
