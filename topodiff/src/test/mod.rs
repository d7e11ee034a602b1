mod test_mesh;
