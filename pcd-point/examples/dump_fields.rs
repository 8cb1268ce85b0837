use pcd_point::pointcloud::field::FieldReflect;
use pcd_point::pointcloud::point::ConfidencePoint;

fn main() {
    println!("ConfidencePoint field table:");
    for field in ConfidencePoint::fields() {
        println!(
            "  {name:<18} {datatype:?} x{count} @ byte {offset}",
            name = field.name,
            datatype = field.datatype,
            count = field.count,
            offset = field.offset,
        );
    }

    let point = ConfidencePoint::new(1.0, 2.0, 3.0, 255, 64, 0, 0.87);
    println!("Sample point: {}", point);
    println!("As JSON: {}", serde_json::to_string(&point).unwrap());
}
