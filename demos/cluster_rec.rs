// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Demonstration of marshaling a cluster record to a hash and back.
 */

#[macro_use] extern crate clap;
extern crate failure;
#[macro_use] extern crate slurmdb_hv;

use clap::{Arg, App};
use failure::Error;
use slurmdb_hv::{Marshaler, Hv, Record, Schema, INFINITE, NO_VAL};
use std::process;


#[derive(Debug, Default)]
struct ClusterRec {
    classification: u16,
    control_host: Option<String>,
    control_port: u32,
    name: Option<String>,
    rpc_version: u16,
}

impl Record for ClusterRec {
    fn schema() -> Schema<Self> {
        Schema::new("cluster_rec")
            .field(field!(ClusterRec, classification: u16))
            .field(field!(ClusterRec, control_host: Option<String>))
            .field(field!(ClusterRec, control_port: u32))
            .field(field!(ClusterRec, name: Option<String>, required))
            .field(field!(ClusterRec, rpc_version: u16))
    }
}


fn main() {
    let matches = App::new("cluster_rec")
        .version(crate_version!())
        .about("Convert a cluster record to a hash and back.")
        .arg(Arg::with_name("NAME")
             .help("The name of the cluster")
             .required(true)
             .index(1))
        .arg(Arg::with_name("host")
             .long("host")
             .takes_value(true)
             .help("The controller host; left unset if not given"))
        .arg(Arg::with_name("port")
             .long("port")
             .takes_value(true)
             .help("The controller port; INFINITE if not given"))
        .get_matches();

    let name = matches.value_of("NAME").unwrap();
    let host = matches.value_of("host");
    let port = matches.value_of("port");

    process::exit(match inner(name, host, port) {
        Ok(code) => code,

        Err(e) => {
            eprintln!("fatal error in cluster_rec");
            for cause in e.iter_chain() {
                eprintln!("  caused by: {}", cause);
            }
            1
        },
    });
}


fn inner(name: &str, host: Option<&str>, port: Option<&str>) -> Result<i32, Error> {
    let control_port = match port {
        Some(p) => p.parse::<u32>()?,
        None => INFINITE,
    };

    let rec = ClusterRec {
        classification: NO_VAL as u16,
        control_host: host.map(str::to_owned),
        control_port,
        name: Some(name.to_owned()),
        rpc_version: 8448,
    };

    let m = Marshaler::default();
    let mut hv = Hv::new();
    rec.to_hash(&m, &mut hv)?;
    println!("native:  {:?}", rec);
    println!("hash:    {}", hv);

    let back = ClusterRec::from_hash(&m, &hv)?;
    println!("back:    {:?}", back);
    println!("classification unset: {}", back.classification == NO_VAL as u16);
    println!("control port unbounded: {}", back.control_port == INFINITE);

    Ok(0)
}
