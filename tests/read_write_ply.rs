use meshio::{CellBlock, CellType, Dtype, DynArray, Endianness, Mesh, MeshData, Warning, WriteOptions};
use ndarray::{array, Array2};

const CUBE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static/cube_ascii.ply");

fn create_mesh() -> Mesh {
    let points = array![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.5, 0.5, 1.25],
    ];

    let cells = vec![
        CellBlock::new(
            "triangle",
            array![[0i32, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]],
        )
        .unwrap(),
        CellBlock::new("quad", array![[0i32, 3, 2, 1]]).unwrap(),
    ];

    let mut data = MeshData::default();
    data.point_data.insert(
        "temperature".into(),
        DynArray::from(array![0.1, 0.2, 0.3, 0.4, 1e-12]),
    );

    Mesh::from_parts(points, cells, data).unwrap()
}

#[test]
fn read_fixture() {
    let mesh = meshio::read(CUBE, None).unwrap();

    assert_eq!(mesh.points.dtype(), Dtype::Float32);
    assert_eq!(mesh.points.shape(), &[8, 3]);
    assert_eq!(
        mesh.points.view::<f32>().unwrap(),
        &array![
            [0.0f32, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ]
        .into_dyn()
    );

    assert_eq!(
        mesh.point_data["red"].view::<u8>().unwrap(),
        &array![0u8, 255, 0, 255, 0, 255, 0, 255].into_dyn()
    );

    assert_eq!(mesh.cells.len(), 2);
    assert_eq!(mesh.cells[0].cell_type(), &CellType::Quad);
    assert_eq!(mesh.cells[0].len(), 4);
    assert_eq!(mesh.cells[1].cell_type(), &CellType::Triangle);
    assert_eq!(
        mesh.cells[1].data().view::<i32>().unwrap(),
        &array![[1, 2, 6], [1, 6, 5], [0, 4, 7], [0, 7, 3]].into_dyn()
    );

    let material = &mesh.cell_data["material"];
    assert_eq!(material.len(), 2);
    assert_eq!(
        material[0].view::<i32>().unwrap(),
        &array![1, 2, 3, 4].into_dyn()
    );
    assert_eq!(
        material[1].view::<i32>().unwrap(),
        &array![5, 5, 6, 6].into_dyn()
    );

    assert_eq!(meshio::ply::read_file(CUBE).unwrap(), mesh);
}

#[test]
fn ascii_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pyramid.ply");

    let mut mesh = create_mesh();
    let warnings = meshio::write(&path, &mut mesh, None, &WriteOptions::ascii()).unwrap();
    assert!(warnings.is_empty());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("ply\nformat ascii 1.0\n"));

    let output = meshio::read(&path, None).unwrap();
    assert_eq!(output, mesh);
}

#[test]
fn binary_stream_round_trip() {
    for byte_order in [Endianness::Little, Endianness::Big] {
        let options = WriteOptions {
            binary: true,
            byte_order: Some(byte_order),
        };

        let mut mesh = create_mesh();
        let mut buffer = Vec::new();
        meshio::write_stream(&mut buffer, &mut mesh, "ply", &options).unwrap();

        let output = meshio::read_stream(&mut buffer.as_slice(), "ply").unwrap();
        assert_eq!(output, mesh);
    }
}

#[test]
fn binary_file_round_trip_native_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pyramid.PLY");

    let mut mesh = create_mesh();
    meshio::write(&path, &mut mesh, None, &WriteOptions::default()).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let expected = match Endianness::native() {
        Endianness::Little => "format binary_little_endian 1.0\n",
        Endianness::Big => "format binary_big_endian 1.0\n",
    };
    assert!(String::from_utf8_lossy(&bytes).contains(expected));

    assert_eq!(meshio::read(&path, None).unwrap(), mesh);
}

#[test]
fn single_precision_points() {
    let points = array![[0.0f32, 0.0], [1.5, 0.0], [0.0, 2.5]];
    let cells = vec![CellBlock::new("triangle", array![[0u32, 1, 2]]).unwrap()];
    let mut mesh = Mesh::new(points, cells).unwrap();

    let mut buffer = Vec::new();
    meshio::write_stream(&mut buffer, &mut mesh, "ply", &WriteOptions::binary()).unwrap();

    let output = meshio::read_stream(&mut buffer.as_slice(), "ply").unwrap();
    assert_eq!(output.points.dtype(), Dtype::Float32);
    assert_eq!(output.dim(), 2);
    assert_eq!(output, mesh);
}

#[test]
fn int64_cells_are_narrowed() {
    let points = Array2::<f64>::zeros((4, 3));
    let cells = vec![
        CellBlock::new("line", array![[0i64, 1], [1, 2]]).unwrap(),
        CellBlock::new("quad", array![[0i64, 1, 2, 3]]).unwrap(),
    ];
    let mut mesh = Mesh::new(points, cells).unwrap();

    let mut buffer = Vec::new();
    let warnings =
        meshio::write_stream(&mut buffer, &mut mesh, "ply", &WriteOptions::binary()).unwrap();

    assert_eq!(
        warnings,
        vec![Warning::NarrowedIndices {
            format: "ply",
            from: Dtype::Int64,
            to: Dtype::Int32,
        }]
    );

    let output = meshio::read_stream(&mut buffer.as_slice(), "ply").unwrap();
    assert_eq!(output.cells.len(), 2);
    assert!(output.cells.iter().all(|block| block.dtype() == Dtype::Int32));
    assert_eq!(
        output.cells[0].data().view::<i32>().unwrap(),
        &array![[0, 1], [1, 2]].into_dyn()
    );
}

#[test]
fn fixture_converts_to_binary() {
    let mut mesh = meshio::read(CUBE, None).unwrap();

    let mut buffer = Vec::new();
    let warnings =
        meshio::write_stream(&mut buffer, &mut mesh, "ply", &WriteOptions::binary()).unwrap();

    assert_eq!(
        warnings,
        vec![Warning::SkippedCellData {
            format: "ply",
            name: "material".into(),
        }]
    );

    let output = meshio::read_stream(&mut buffer.as_slice(), "ply").unwrap();
    assert_eq!(output.points, mesh.points);
    assert_eq!(output.point_data, mesh.point_data);
    assert_eq!(output.cells, mesh.cells);
    assert!(output.cell_data.is_empty());
}

#[test]
fn write_points_cells_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edge.ply");

    let warnings = meshio::write_points_cells(
        &path,
        array![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
        vec![CellBlock::new("line", array![[0u8, 1]]).unwrap()],
        MeshData::default(),
        None,
        &WriteOptions::ascii(),
    )
    .unwrap();
    assert!(warnings.is_empty());

    let mesh = meshio::read(&path, Some("ply")).unwrap();
    assert_eq!(mesh.num_points(), 2);
    assert_eq!(mesh.cells[0].cell_type(), &CellType::Line);
    assert_eq!(mesh.cells[0].dtype(), Dtype::UInt8);
}

#[test]
fn rejected_mesh_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.ply");

    let mut mesh = create_mesh();
    mesh.cells
        .push(CellBlock::new("triangle", array![[0i32, 1, 2, 3]]).unwrap());

    let out = meshio::write(&path, &mut mesh, None, &WriteOptions::ascii());
    assert!(matches!(out, Err(meshio::Error::ShapeMismatch(_))));
    assert!(!path.exists());
}

#[test]
fn encoder_rejection_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.ply");

    let mut mesh = create_mesh();
    mesh.cells
        .push(CellBlock::new("line", array![[0u8, 1]]).unwrap());

    let out = meshio::write(&path, &mut mesh, None, &WriteOptions::binary());
    assert!(matches!(out, Err(meshio::Error::UnsupportedOperation(_))));
    assert!(!path.exists());
}

#[test]
fn truncated_binary_body() {
    let mut mesh = create_mesh();
    let mut buffer = Vec::new();
    meshio::write_stream(&mut buffer, &mut mesh, "ply", &WriteOptions::binary()).unwrap();

    buffer.truncate(buffer.len() - 3);

    let out = meshio::read_stream(&mut buffer.as_slice(), "ply");
    assert!(matches!(out, Err(meshio::Error::MalformedBody(_))));
}
