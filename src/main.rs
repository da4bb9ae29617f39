use log::info;
use std::sync::Arc;

use whitted_rs::*;

fn main() -> Result<(), failure::Error> {
    simple_logger::init()?;
    info!("starting");

    let width = 640;
    let height = 400;
    let background = Colorf::new(0.05, 0.07, 0.12);

    let scene = build_scene()?;
    let mut camera = Camera::new(
        Point3f::new(6.0, 4.0, 10.0),
        Point3f::new(0.0, 0.5, 0.0),
        Vector3f::unit_y(),
        Deg(50.0),
        Projection::Perspective,
    )?;
    camera.max_depth = 5;

    let frame = render(&scene, &camera, background, width, height);
    frame.mk_image().save("out.png")?;
    info!("wrote out.png");
    Ok(())
}

fn build_scene() -> Result<Scene, failure::Error> {
    let mut scene = Scene::new();

    // Checkered floor, aligned to its own placement.
    let floor_transform = Transform::rotate_x(Rad(-PI / 2.0));
    let mut floor_pattern = Checker::new(
        Colorf::new(0.9, 0.9, 0.9),
        Colorf::new(0.15, 0.15, 0.2),
        1.0,
    );
    floor_pattern.set_object_transform(floor_transform.inverse());
    scene.add_shape(Box::new(Plane::new(floor_transform, Arc::new(floor_pattern))));

    // A die: cube with a sphere carved out of its corner.
    let die = CsgShape::new(
        CsgOp::Difference,
        Box::new(Cube::new(Transform::identity(), Arc::new(Phong::matte(Colorf::new(0.8, 0.3, 0.25))))),
        Box::new(Sphere::new(
            0.8,
            Transform::translate(Vector3f::new(1.0, 1.0, 1.0)),
            Arc::new(Phong::matte(Colorf::new(0.95, 0.85, 0.3))),
        )),
        Transform::translate(Vector3f::new(-2.5, 1.0, 0.0)),
        Arc::new(Phong::matte(Colorf::new(0.8, 0.3, 0.25))),
    )?;
    scene.add_shape(Box::new(die));

    // Mirrored sphere and a glass one.
    scene.add_shape(Box::new(Sphere::new(
        1.0,
        Transform::translate(Vector3f::new(0.0, 1.0, 0.0)),
        Arc::new(Phong::polished(Colorf::new(0.7, 0.75, 0.8), 0.6)),
    )));
    scene.add_shape(Box::new(Sphere::new(
        0.8,
        Transform::translate(Vector3f::new(2.4, 0.8, 1.5)),
        Arc::new(Phong::glass(1.5)),
    )));

    // A slim torus leaning against nothing in particular.
    scene.add_shape(Box::new(Torus::new(
        1.2,
        0.35,
        Transform::rotate_x(Rad(PI / 2.0)).then(&Transform::translate(Vector3f::new(-0.2, 1.55, -2.8))),
        Arc::new(Phong::polished(Colorf::new(0.3, 0.6, 0.4), 0.2)),
    )));

    scene.add_light(Box::new(AmbientLight {
        color: Colorf::new(1.0, 1.0, 1.0),
        intensity: 0.15,
    }));
    scene.add_light(Box::new(PointLight::new(
        Point3f::new(8.0, 10.0, 6.0),
        Colorf::new(1.0, 1.0, 1.0),
        0.9,
    )));
    scene.add_light(Box::new(SpotLight::new(
        Point3f::new(-6.0, 8.0, 4.0),
        Vector3f::new(0.6, -0.8, -0.4),
        Rad(0.5),
        Colorf::new(0.9, 0.9, 1.0),
        0.6,
    )));

    Ok(scene)
}
