/*!

This is the long-form manual for `itn_coverage` and `itncov`.

## Input formats

The survey is read from an Excel workbook (`xlsx`) or from a `csv` export of
the same form. The first row holds the column names. The columns that are
read, with their default names:

| column                                                 | content                       |
|--------------------------------------------------------|-------------------------------|
| `Scan QR code`                                         | the scanned payload           |
| `How many pupils are enrolled in Class {class}?`       | enrollment of the class       |
| `How many boys in Class {class} received ITNs?`        | nets given to boys            |
| `How many girls in Class {class} received ITNs?`       | nets given to girls           |
| `ITNs left at the school for pupils who were absent.`  | nets left at the school       |

`{class}` runs from 1 to 5. A missing column is reported once and counts as
zero. Other columns are ignored.

The payload is free text over several lines. The district and the chiefdom
are read from the lines starting with `District:` and `Chiefdom:`:

```text
School: Kakua Primary
District: BO
Chiefdom: Kakua
```

Counts are truncated to integers. Empty cells, text that is not a number and
negative numbers count as zero.

### Boundaries

The boundary dataset is read from the attribute table of the chiefdom
shapefile, exported as csv. The columns `FIRST_DNAM` (district) and
`FIRST_CHIE` (chiefdom) are used. The chiefdom names of this file are the
canonical names.

## Calculation

For every school:

```text
distributed = sum of boys + sum of girls + left at school
enrollment  = sum of enrolled
```

The nets left at the school are counted once per school, never per class.
Chiefdom, district and overall statistics sum the values of their schools,
and the coverage is `100 * distributed / enrollment`, or 0 without enrollment.
The tables show the coverage as computed, possibly above 100%. The map panels
cap it at 100%.

## Coverage buckets

| coverage     | status      | color                 |
|--------------|-------------|-----------------------|
| below 20%    | Critical    | red `#d32f2f`         |
| 20% to 40%   | Poor        | orange `#f57c00`      |
| 40% to 60%   | Fair        | yellow `#fbc02d`      |
| 60% to 80%   | Good        | light green `#388e3c` |
| 80% to 100%  | Excellent   | blue `#1976d2`        |
| 100% or more | Outstanding | purple `#4a148c`      |

A coverage equal to a bound goes to the upper bucket.

## Chiefdom names

The chiefdoms are typed by hand in the survey. They are matched to the
boundary names with an alias table: first on the exact spelling, then
without case, then when one name contains the other. When several aliases
contain the name, the first one of the table wins (or the longest one, with
`substringTieBreak` set to `longestKey`). A name that matches nothing is kept
as written and reported in the logs.

## Configuration

The configuration is a JSON file. All the sections are optional. File paths
are relative to the configuration file.

```json
{
  "outputSettings": {
    "outputDirectory": "out"
  },
  "surveySources": [
    {
      "provider": "xlsx",
      "filePath": "survey.xlsx",
      "excelWorksheetName": "Sheet1"
    }
  ],
  "boundarySource": {
    "filePath": "chiefdoms.csv",
    "districtColumn": "FIRST_DNAM",
    "chiefdomColumn": "FIRST_CHIE"
  },
  "layout": {
    "payloadColumn": "Scan QR code",
    "firstClass": 1,
    "lastClass": 5,
    "districts": ["BO", "BOMBALI"],
    "goodCoverageThreshold": 60,
    "panelColumns": 4
  },
  "aliases": {
    "replaceDefaults": false,
    "substringTieBreak": "tableOrder",
    "entries": [
      { "source": "Bo City Council", "canonical": "BO TOWN" }
    ]
  }
}
```

The command line options override the configuration.

## Outputs

- `summary.json`: the overall, district and chiefdom statistics, the data
  quality checks and, with a boundary file, the map panels.
- `coverage_by_chiefdom.csv`: one line per chiefdom of the target districts.
- `distribution_summary.csv`: the district lines, then the chiefdom lines.

*/
